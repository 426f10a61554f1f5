// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote data store abstraction.
//!
//! The hosted backend exposes three surfaces the client depends on:
//! an auth service that knows the signed-in identity, a row store that
//! enforces per-owner access, and a change feed that pushes row events.
//! [`RemoteStore`] bundles them behind one trait so the sync core can run
//! against the real service ([`HttpStore`]) or an in-process fake
//! ([`MemoryBackend`]).
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  SyncCore   │────►│ RemoteStore  │────►│ auth / rows  │
//! │             │◄────│   (trait)    │◄────│ change feed  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

mod http;
mod memory;
mod realtime;

use std::future::Future;
use std::pin::Pin;

use smark_core::{ChangeEvent, ChannelSpec, Filter, Identity, Query, Row};
use tokio::sync::{mpsc, oneshot};

pub use http::{HttpSettings, HttpStore};
pub use memory::{MemoryBackend, MemoryStore, Operation};
pub use realtime::{websocket_url, Backoff, RealtimeSettings, SharedSession};

/// Boxed future returned by [`RemoteStore`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Buffered events per subscription before the feed applies backpressure.
pub const FEED_CAPACITY: usize = 64;

/// Error type for remote store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// The service could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The session is missing, expired, or lacks permission.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The service answered with an error status.
    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered with something that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The change feed closed before the request completed.
    #[error("change feed closed")]
    Closed,
}

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Item delivered on a subscription's stream.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A row event that passed the subscription's filter.
    Change(ChangeEvent),
    /// The feed dropped and rejoined; events in between may be lost.
    Resumed,
}

/// Receiving half of a subscription.
pub type ChangeStream = mpsc::Receiver<FeedEvent>;

/// Handle identifying an open subscription.
///
/// Dropping the handle stops the feed. [`RemoteStore::unsubscribe`]
/// additionally tells the remote side the channel is gone.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
    channel: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl SubscriptionHandle {
    pub(crate) fn new(id: u64, channel: impl Into<String>) -> Self {
        SubscriptionHandle {
            id,
            channel: channel.into(),
            shutdown: None,
        }
    }

    pub(crate) fn with_shutdown(
        id: u64,
        channel: impl Into<String>,
        shutdown: oneshot::Sender<()>,
    ) -> Self {
        SubscriptionHandle {
            id,
            channel: channel.into(),
            shutdown: Some(shutdown),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Signals the feed task to leave its channel. Idempotent.
    pub(crate) fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// The backend surface the sync core depends on.
///
/// Row access is governed by the remote: queries return only rows the
/// current identity may read, and inserts or deletes outside that scope
/// are rejected or affect nothing.
pub trait RemoteStore: Send + Sync {
    /// Returns the signed-in identity, or `None` when there is no valid session.
    fn current_identity(&self) -> BoxFuture<'_, RemoteResult<Option<Identity>>>;

    /// Runs a read query and returns the raw rows in remote order.
    fn query(&self, query: Query) -> BoxFuture<'_, RemoteResult<Vec<Row>>>;

    /// Inserts one row into `table`.
    fn insert(&self, table: &str, fields: Row) -> BoxFuture<'_, RemoteResult<()>>;

    /// Deletes every row in `table` matching `filter`. Matching nothing is not an error.
    fn delete(&self, table: &str, filter: Filter) -> BoxFuture<'_, RemoteResult<()>>;

    /// Opens a change subscription described by `spec`.
    fn subscribe(
        &self,
        spec: ChannelSpec,
    ) -> BoxFuture<'_, RemoteResult<(SubscriptionHandle, ChangeStream)>>;

    /// Closes a subscription previously returned by [`RemoteStore::subscribe`].
    fn unsubscribe(&self, handle: SubscriptionHandle) -> BoxFuture<'_, RemoteResult<()>>;

    /// Builds the URL that starts an OAuth sign-in with `provider`.
    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> RemoteResult<String>;

    /// Ends the current session.
    fn sign_out(&self) -> BoxFuture<'_, RemoteResult<()>>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
