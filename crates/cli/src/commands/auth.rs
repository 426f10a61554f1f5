// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `login`, `logout` and `whoami`.
//!
//! Sign-in happens in the browser. `smark login` prints the provider URL;
//! after signing in, the browser lands on the redirect URL with the session
//! tokens in its fragment, and `smark login --callback <url>` stores them.

use std::io::Write;
use std::path::Path;

use crate::cli::{OutputFormat, SignInArgs};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::remote::{HttpStore, RemoteStore};
use crate::session::{self, SessionGuard};

use super::{Connection, OFFLINE_EMAIL, SIGN_IN_HINT};

/// Prints the sign-in URL, or completes sign-in from `callback`.
pub async fn login(
    config: &Config,
    session_path: &Path,
    sign_in: &SignInArgs,
    callback: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let settings = config.http_settings()?;
    let realtime = config.realtime_settings()?;

    let Some(callback) = callback else {
        let store = HttpStore::new(settings, realtime, None)?;
        let provider = sign_in.provider.as_deref().unwrap_or(&config.provider);
        let redirect_to = sign_in.redirect_to.as_deref().unwrap_or(&config.redirect_to);
        let url = store.sign_in_url(provider, redirect_to)?;
        writeln!(out, "Open this URL to sign in:\n  {url}")?;
        writeln!(
            out,
            "Then run: smark login --callback \"<the URL you were redirected to>\""
        )?;
        return Ok(());
    };

    let credentials = Credentials::from_callback(callback)?;
    let store = HttpStore::new(settings, realtime, Some(credentials))?;
    let identity = store
        .current_identity()
        .await?
        .ok_or_else(|| Error::SignInFailed("the session was not accepted".to_string()))?;

    if let Some(credentials) = store.credentials().await {
        credentials.save(session_path)?;
    }
    tracing::info!(user = %identity.id, "signed in");
    writeln!(out, "Signed in as {}", identity.email)?;
    Ok(())
}

/// Ends the remote session and forgets the saved one.
///
/// The saved session is removed even when the remote call fails or the
/// project cannot be opened (`conn` is `None`).
pub async fn logout(conn: Option<&Connection>, session_path: &Path, out: &mut dyn Write) -> Result<()> {
    match conn {
        Some(conn) => {
            let guard = SessionGuard::new(SIGN_IN_HINT);
            if let Err(e) = session::sign_out(conn.store().as_ref(), &guard).await {
                tracing::warn!(error = %e, "remote sign-out failed");
            }
        }
        None if !session_path.exists() => {
            writeln!(out, "Not signed in")?;
            return Ok(());
        }
        None => {}
    }
    Credentials::clear(session_path)?;
    writeln!(out, "Signed out")?;
    Ok(())
}

pub async fn whoami(conn: &Connection, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let identity = conn.signed_in().await?;
    match format {
        OutputFormat::Text => {
            if identity.email == OFFLINE_EMAIL {
                writeln!(out, "{} (offline)", identity.email)?;
            } else {
                writeln!(out, "{} ({})", identity.email, identity.id)?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&identity)?)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
