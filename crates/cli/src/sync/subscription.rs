// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped ownership of a change subscription.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::engine::{SyncError, SyncResult};
use crate::remote::{RemoteStore, SubscriptionHandle};

/// Owns a change subscription and the task that turns its events into
/// refreshes.
///
/// Prefer [`SubscriptionGuard::release`], which reports unsubscribe
/// failures. Dropping the guard also releases the subscription: the
/// forwarding task is aborted and the unsubscribe runs in the background
/// (or the feed is simply stopped when no runtime is available).
pub struct SubscriptionGuard<S: RemoteStore + ?Sized + 'static> {
    store: Arc<S>,
    handle: Option<SubscriptionHandle>,
    task: Option<JoinHandle<()>>,
}

impl<S: RemoteStore + ?Sized + 'static> SubscriptionGuard<S> {
    pub(crate) fn new(store: Arc<S>, handle: SubscriptionHandle, task: JoinHandle<()>) -> Self {
        SubscriptionGuard {
            store,
            handle: Some(handle),
            task: Some(task),
        }
    }

    /// Channel name of the held subscription.
    pub fn channel(&self) -> Option<&str> {
        self.handle.as_ref().map(SubscriptionHandle::channel)
    }

    /// Stops forwarding events and closes the subscription on the remote.
    pub async fn release(mut self) -> SyncResult<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(handle) = self.handle.take() {
            let channel = handle.channel().to_string();
            self.store
                .unsubscribe(handle)
                .await
                .map_err(|source| SyncError::Remote {
                    action: "unsubscribe",
                    source,
                })?;
            tracing::debug!(channel, "subscription released");
        }
        Ok(())
    }
}

impl<S: RemoteStore + ?Sized + 'static> Drop for SubscriptionGuard<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let store = Arc::clone(&self.store);
                runtime.spawn(async move {
                    if let Err(e) = store.unsubscribe(handle).await {
                        tracing::debug!(error = %e, "background unsubscribe failed");
                    }
                });
            }
            Err(_) => handle.stop(),
        }
    }
}
