// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! smark-core: Shared data model for the smark bookmark client
//!
//! This crate provides the typed records, query descriptions, change events
//! and change-feed frames used by the remote store implementations and the
//! synchronization core. It performs no I/O.

pub mod bookmark;
pub mod change;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod query;

pub use bookmark::{decode_rows, Bookmark, Decoded, NewBookmark, Row, OWNER_COLUMN};
pub use change::{ChangeEvent, ChangeKind, ChannelSpec};
pub use error::{Error, Result};
pub use identity::{Identity, UserId};
pub use protocol::{Frame, Inbound};
pub use query::{Direction, Filter, Order, Query, BOOKMARKS};
