// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Saved session tokens.
//!
//! After an OAuth sign-in the provider redirects the browser to
//! `redirect_to` with the session in the URL fragment
//! (`#access_token=..&refresh_token=..&expires_at=..`). `smark login
//! --callback <URL>` parses that URL and stores the tokens as JSON in the
//! config directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Tokens of a signed-in session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Credentials {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Extracts tokens from the URL the provider redirected to.
    ///
    /// Parameters are read from the fragment, falling back to the query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignInFailed`] if the provider reported an error, and
    /// [`Error::CallbackMissingToken`] if no access token is present.
    pub fn from_callback(url: &str) -> Result<Self> {
        let params = callback_params(url);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };

        if let Some(description) = get("error_description").or_else(|| get("error")) {
            return Err(Error::SignInFailed(description));
        }
        let access_token = get("access_token").ok_or(Error::CallbackMissingToken)?;
        Ok(Credentials {
            access_token,
            refresh_token: get("refresh_token"),
            expires_at: get("expires_at").and_then(|v| v.parse().ok()),
        })
    }

    /// Reads saved credentials. `None` when nothing is saved.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes credentials, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        restrict_permissions(path)?;
        Ok(())
    }

    /// Removes saved credentials. Succeeds if none were saved.
    pub fn clear(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn callback_params(url: &str) -> Vec<(String, String)> {
    let raw = match url.split_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment,
        _ => url
            .split_once('?')
            .map(|(_, query)| query.split('#').next().unwrap_or(query))
            .unwrap_or(""),
    };
    raw.split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let value = urlencoding::decode(&value.replace('+', " "))
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((key.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
