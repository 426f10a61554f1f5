// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::remote::RemoteError;
use crate::sync::SyncError;

/// All possible errors that can occur in the smark library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not signed in\n  hint: run 'smark login' to sign in")]
    NotSignedIn,

    #[error("{setting} is not configured\n  hint: set {env} or add '{key}' to {path}")]
    NotConfigured {
        setting: &'static str,
        env: &'static str,
        key: &'static str,
        path: String,
    },

    #[error("callback URL has no access token\n  hint: paste the full URL the browser was redirected to")]
    CallbackMissingToken,

    #[error("sign-in failed: {0}")]
    SignInFailed(String),

    #[error("bookmark not found: {0}")]
    BookmarkNotFound(String),

    #[error("ambiguous bookmark ID '{prefix}' matches: {}", matches.join(", "))]
    AmbiguousId {
        prefix: String,
        matches: Vec<String>,
    },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(#[from] smark_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("some operations failed: {succeeded} succeeded, {failed} failed")]
    PartialBulkFailure {
        succeeded: usize,
        failed: usize,
        unknown_ids: Vec<String>,
    },
}

/// A specialized Result type for smark operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
