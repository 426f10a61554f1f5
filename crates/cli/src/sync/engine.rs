// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The synchronization core proper.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use smark_core::{decode_rows, Bookmark, ChannelSpec, Filter, Identity, NewBookmark, Query, BOOKMARKS};
use tokio::sync::watch;

use super::mirror::{Applied, Mirror, Snapshot};
use super::subscription::SubscriptionGuard;
use crate::remote::{ChangeStream, FeedEvent, RemoteError, RemoteStore};

/// Error type for sync core operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// User input was rejected before reaching the remote.
    #[error(transparent)]
    Invalid(#[from] smark_core::Error),

    /// The remote store failed.
    #[error("could not {action}: {source}")]
    Remote {
        action: &'static str,
        #[source]
        source: RemoteError,
    },
}

impl SyncError {
    /// Short message suitable for showing to the user.
    pub fn notice(&self) -> String {
        match self {
            SyncError::Invalid(smark_core::Error::FieldEmpty { .. }) => "Fill all fields".to_string(),
            SyncError::Invalid(e) => e.to_string(),
            SyncError::Remote { action, .. } => format!("Could not {action}"),
        }
    }

    /// The underlying remote failure, if any.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            SyncError::Remote { source, .. } => Some(source),
            SyncError::Invalid(_) => None,
        }
    }
}

/// Result type for sync core operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Mirror of one identity's bookmarks, kept in step with a [`RemoteStore`].
///
/// The core never edits the mirror optimistically: every write goes to the
/// remote and is followed by a full refresh.
pub struct SyncCore<S: RemoteStore + ?Sized + 'static> {
    store: Arc<S>,
    identity: Identity,
    mirror: Mutex<Mirror>,
    updates: watch::Sender<Snapshot>,
}

impl<S: RemoteStore + ?Sized + 'static> SyncCore<S> {
    /// Creates a core with an empty mirror. Nothing is fetched until
    /// [`SyncCore::refresh`] runs.
    pub fn new(store: Arc<S>, identity: Identity) -> Self {
        let (updates, _) = watch::channel(Snapshot::default());
        SyncCore {
            store,
            identity,
            mirror: Mutex::new(Mirror::default()),
            updates,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Current snapshot of the mirror.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot().clone()
    }

    /// Current mirrored bookmarks, newest first.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.lock().snapshot().bookmarks.clone()
    }

    /// Receiver that observes every snapshot change.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Re-queries the remote and replaces the mirror with the result.
    ///
    /// Returns [`Applied::Stale`] when a refresh issued later has already
    /// been applied. Malformed rows are dropped and logged. On failure the
    /// mirror is left unchanged and a notice is published.
    pub async fn refresh(&self) -> SyncResult<Applied> {
        let ticket = self.lock().issue();

        let rows = match self.store.query(Query::bookmarks_newest_first()).await {
            Ok(rows) => rows,
            Err(source) => {
                let err = SyncError::Remote {
                    action: "load bookmarks",
                    source,
                };
                tracing::warn!(error = %err, "refresh failed");
                let mut mirror = self.lock();
                if !mirror.is_superseded(ticket) {
                    mirror.notify(err.notice());
                    self.updates.send_replace(mirror.snapshot().clone());
                }
                return Err(err);
            }
        };

        let decoded = decode_rows(rows);
        for rejected in &decoded.rejected {
            tracing::warn!(error = %rejected, "dropping malformed bookmark row");
        }
        let count = decoded.records.len();

        let outcome = {
            let mut mirror = self.lock();
            let outcome = mirror.apply(ticket, decoded.records);
            if outcome == Applied::Fresh {
                self.updates.send_replace(mirror.snapshot().clone());
            }
            outcome
        };
        match outcome {
            Applied::Fresh => tracing::debug!(count, "mirror refreshed"),
            Applied::Stale => tracing::debug!(count, "discarding stale refresh result"),
        }
        Ok(outcome)
    }

    /// Creates a bookmark owned by this core's identity, then refreshes.
    ///
    /// Empty (or whitespace-only) input is rejected without contacting the
    /// remote. A failed insert leaves the mirror unchanged and skips the
    /// refresh. Once the insert has succeeded, a failing refresh is only
    /// surfaced as a notice.
    pub async fn add(&self, title: &str, url: &str) -> SyncResult<()> {
        let draft = NewBookmark::new(title, url, &self.identity.id)?;
        self.store
            .insert(BOOKMARKS, draft.to_row())
            .await
            .map_err(|source| self.surface("add bookmark", source))?;
        tracing::info!(title = draft.title(), "bookmark added");

        self.refresh_after_write().await;
        Ok(())
    }

    /// Deletes the bookmark with `id`, then refreshes.
    ///
    /// Deleting an id that does not exist, or that belongs to someone else,
    /// succeeds and changes nothing.
    pub async fn remove(&self, id: &str) -> SyncResult<()> {
        self.store
            .delete(BOOKMARKS, Filter::eq("id", id))
            .await
            .map_err(|source| self.surface("delete bookmark", source))?;
        tracing::info!(id, "bookmark deleted");

        self.refresh_after_write().await;
        Ok(())
    }

    /// Opens the change subscription on `channel` and starts refreshing on
    /// every event. The returned guard owns the subscription.
    pub async fn subscribe(self: &Arc<Self>, channel: &str) -> SyncResult<SubscriptionGuard<S>> {
        let spec = ChannelSpec::bookmarks_for(channel, &self.identity.id);
        let (handle, events) = self
            .store
            .subscribe(spec)
            .await
            .map_err(|source| self.surface("subscribe to changes", source))?;
        tracing::debug!(channel, "subscribed to bookmark changes");

        let task = tokio::spawn(forward(Arc::downgrade(self), events));
        Ok(SubscriptionGuard::new(Arc::clone(&self.store), handle, task))
    }

    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "refresh after write failed");
        }
    }

    /// Logs a remote failure and publishes its notice.
    fn surface(&self, action: &'static str, source: RemoteError) -> SyncError {
        let err = SyncError::Remote { action, source };
        tracing::warn!(error = %err, "remote operation failed");
        let mut mirror = self.lock();
        mirror.notify(err.notice());
        self.updates.send_replace(mirror.snapshot().clone());
        err
    }

    fn lock(&self) -> MutexGuard<'_, Mirror> {
        self.mirror.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Turns feed events into refreshes until the feed ends or the core is gone.
async fn forward<S: RemoteStore + ?Sized + 'static>(core: Weak<SyncCore<S>>, mut events: ChangeStream) {
    while let Some(event) = events.recv().await {
        let mut coalesced = 0usize;
        while events.try_recv().is_ok() {
            coalesced += 1;
        }
        let Some(core) = core.upgrade() else {
            break;
        };
        match &event {
            FeedEvent::Change(change) => {
                tracing::debug!(kind = %change.kind, coalesced, "change event, refreshing")
            }
            FeedEvent::Resumed => tracing::debug!("change feed resumed, refreshing"),
        }
        if let Err(e) = core.refresh().await {
            tracing::debug!(error = %e, "refresh after change event failed");
        }
    }
    tracing::debug!("change stream ended");
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
