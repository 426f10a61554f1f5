// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side synchronization core.
//!
//! Keeps a local, newest-first mirror of the signed-in user's bookmarks
//! consistent with the remote store.
//!
//! ```text
//! ┌─────────────┐  add/remove  ┌─────────────┐   query    ┌─────────────┐
//! │   Caller    │─────────────►│  SyncCore   │───────────►│ RemoteStore │
//! │ (CLI, form) │◄─────────────│  (mirror)   │◄───────────│             │
//! └─────────────┘   snapshot   └─────────────┘   events   └─────────────┘
//! ```
//!
//! # Features
//!
//! - Full re-query on every refresh; the remote's order is kept verbatim
//! - Writes go to the remote first, then trigger a refresh
//! - Overlapping refreshes resolve in issue order (see [`Ticket`])
//! - Change events of any kind trigger a refresh; queued events coalesce
//! - Failures surface through [`Snapshot::notice`] and leave the list as is
//! - [`SubscriptionGuard`] releases the change subscription exactly once

mod engine;
mod mirror;
mod subscription;

pub use engine::{SyncCore, SyncError, SyncResult};
pub use mirror::{Applied, Snapshot, Ticket};
pub use subscription::SubscriptionGuard;
