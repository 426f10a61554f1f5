// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle.
//!
//! A session moves through three phases:
//!
//! 1. **Activate**: [`SessionGuard::activate`] asks the remote who is signed
//!    in. No session, or a failing check, yields the sign-in redirect.
//! 2. **Bind**: [`ActiveSession::bind`] builds the sync core for the
//!    identity, opens the change subscription and performs the initial
//!    refresh.
//! 3. **Deactivate**: [`ActiveSession::deactivate`] releases the
//!    subscription. [`sign_out`] additionally ends the remote session.

use std::sync::Arc;

use smark_core::Identity;

use crate::remote::{RemoteResult, RemoteStore};
use crate::sync::{SubscriptionGuard, SyncCore, SyncResult};

/// Outcome of checking for a signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Authenticated(Identity),
    /// Not signed in; the user should be sent to `redirect`.
    Unauthenticated { redirect: String },
}

/// What a front end should display while a session is being established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Unauthenticated { redirect: String },
    Ready(Identity),
}

impl From<&Activation> for ViewState {
    fn from(activation: &Activation) -> Self {
        match activation {
            Activation::Authenticated(identity) => ViewState::Ready(identity.clone()),
            Activation::Unauthenticated { redirect } => ViewState::Unauthenticated {
                redirect: redirect.clone(),
            },
        }
    }
}

/// Gate in front of every protected view.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    redirect: String,
}

impl SessionGuard {
    /// `redirect` is where unauthenticated users are sent.
    pub fn new(redirect: impl Into<String>) -> Self {
        SessionGuard {
            redirect: redirect.into(),
        }
    }

    pub fn redirect(&self) -> &str {
        &self.redirect
    }

    /// Resolves the current identity.
    ///
    /// A failing identity check is logged and treated as signed out.
    pub async fn activate<S: RemoteStore + ?Sized>(&self, store: &S) -> Activation {
        match store.current_identity().await {
            Ok(Some(identity)) => {
                tracing::debug!(user = %identity.id, "session active");
                Activation::Authenticated(identity)
            }
            Ok(None) => self.unauthenticated(),
            Err(e) => {
                tracing::warn!(error = %e, "identity check failed, treating as signed out");
                self.unauthenticated()
            }
        }
    }

    fn unauthenticated(&self) -> Activation {
        Activation::Unauthenticated {
            redirect: self.redirect.clone(),
        }
    }
}

/// A signed-in session bound to its sync core.
pub struct ActiveSession<S: RemoteStore + ?Sized + 'static> {
    core: Arc<SyncCore<S>>,
    subscription: Option<SubscriptionGuard<S>>,
}

impl<S: RemoteStore + ?Sized + 'static> ActiveSession<S> {
    /// Binds `identity` to a new sync core.
    ///
    /// The change subscription is opened before the initial refresh so no
    /// change made in between is missed. Neither failure aborts the bind:
    /// both are surfaced through the core's notice, and a session without a
    /// subscription simply has no live updates.
    pub async fn bind(store: Arc<S>, identity: Identity, channel: &str) -> Self {
        let core = Arc::new(SyncCore::new(store, identity));
        let subscription = match core.subscribe(channel).await {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::warn!(error = %e, "live updates unavailable");
                None
            }
        };
        if let Err(e) = core.refresh().await {
            tracing::debug!(error = %e, "initial refresh failed");
        }
        ActiveSession { core, subscription }
    }

    pub fn core(&self) -> &Arc<SyncCore<S>> {
        &self.core
    }

    pub fn identity(&self) -> &Identity {
        self.core.identity()
    }

    /// True while the change subscription is held.
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Releases the change subscription. The core stays usable for reads.
    pub async fn deactivate(mut self) -> SyncResult<Arc<SyncCore<S>>> {
        if let Some(subscription) = self.subscription.take() {
            subscription.release().await?;
        }
        Ok(self.core)
    }
}

/// Ends the remote session and returns the sign-in redirect.
///
/// Callers holding an [`ActiveSession`] should deactivate it first.
pub async fn sign_out<S: RemoteStore + ?Sized>(
    store: &S,
    guard: &SessionGuard,
) -> RemoteResult<String> {
    store.sign_out().await?;
    tracing::info!("signed out");
    Ok(guard.redirect().to_string())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
