// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod auth;
pub mod bookmarks;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use smark_core::Identity;

use crate::config::{config_dir, credentials_path, Config};
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::remote::{HttpStore, MemoryBackend, RemoteStore};
use crate::session::{Activation, SessionGuard};

/// Identity used by `--offline`.
pub const OFFLINE_USER_ID: &str = "offline";
pub const OFFLINE_EMAIL: &str = "offline@localhost";

const OFFLINE_SAMPLES: [(&str, &str); 2] = [
    ("The Rust Book", "https://doc.rust-lang.org/book/"),
    ("Tokio tutorial", "https://tokio.rs/tokio/tutorial"),
];

/// Where unauthenticated users are sent.
pub const SIGN_IN_HINT: &str = "smark login";

/// A remote store opened for one command, plus the saved session it was
/// opened with.
pub struct Connection {
    store: Arc<dyn RemoteStore>,
    config: Config,
    saved: Option<SavedSession>,
}

struct SavedSession {
    http: Arc<HttpStore>,
    path: PathBuf,
    credentials: Credentials,
}

impl Connection {
    /// Opens the configured project with the saved session, or a fresh
    /// in-memory store when `offline` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] when no session is saved.
    pub fn open(offline: bool) -> Result<Self> {
        let config = Config::load_default()?;
        if offline {
            return Ok(Connection::offline(config));
        }

        let path = credentials_path(&config_dir());
        let credentials = Credentials::load(&path)?.ok_or(Error::NotSignedIn)?;
        let http = Arc::new(HttpStore::new(
            config.http_settings()?,
            config.realtime_settings()?,
            Some(credentials.clone()),
        )?);
        let store: Arc<dyn RemoteStore> = Arc::clone(&http) as Arc<dyn RemoteStore>;
        Ok(Connection {
            store,
            config,
            saved: Some(SavedSession {
                http,
                path,
                credentials,
            }),
        })
    }

    /// In-memory store signed in as the offline identity, seeded with a few
    /// sample bookmarks. Nothing persists.
    pub fn offline(config: Config) -> Self {
        let backend = MemoryBackend::new();
        let identity = Identity::new(OFFLINE_USER_ID, OFFLINE_EMAIL);
        for (title, url) in OFFLINE_SAMPLES {
            backend.seed(&identity.id, title, url);
        }
        Connection::with_store(Arc::new(backend.client(Some(identity))), config)
    }

    /// Wraps an already opened store.
    pub fn with_store(store: Arc<dyn RemoteStore>, config: Config) -> Self {
        Connection {
            store,
            config,
            saved: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] when the remote reports no valid session.
    pub async fn signed_in(&self) -> Result<Identity> {
        match SessionGuard::new(SIGN_IN_HINT)
            .activate(self.store.as_ref())
            .await
        {
            Activation::Authenticated(identity) => Ok(identity),
            Activation::Unauthenticated { .. } => Err(Error::NotSignedIn),
        }
    }

    /// Saves the session again if the store refreshed its tokens.
    pub async fn persist(&self) -> Result<()> {
        let Some(saved) = &self.saved else {
            return Ok(());
        };
        match saved.http.credentials().await {
            Some(current) if current != saved.credentials => {
                current.save(&saved.path)?;
                tracing::debug!(path = %saved.path.display(), "refreshed session saved");
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
