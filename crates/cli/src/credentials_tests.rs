// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn test_from_callback_fragment() {
    let creds = Credentials::from_callback(
        "http://localhost:3000/#access_token=at.1&expires_at=1760000000&refresh_token=rt1&token_type=bearer",
    )
    .unwrap();
    assert_eq!(creds.access_token, "at.1");
    assert_eq!(creds.refresh_token.as_deref(), Some("rt1"));
    assert_eq!(creds.expires_at, Some(1_760_000_000));
}

#[test]
fn test_from_callback_query_fallback() {
    let creds = Credentials::from_callback("http://localhost:3000/cb?access_token=a%2Bb").unwrap();
    assert_eq!(creds.access_token, "a+b");
    assert_eq!(creds.refresh_token, None);
}

#[parameterized(
    error_description = { "http://x/#error=access_denied&error_description=User+cancelled", "User cancelled" },
    error_only = { "http://x/?error=server_error", "server_error" },
)]
fn test_from_callback_provider_error(url: &str, expected: &str) {
    let err = Credentials::from_callback(url).unwrap_err();
    assert!(matches!(err, Error::SignInFailed(ref m) if m == expected), "{err}");
}

#[parameterized(
    no_params = { "http://localhost:3000/" },
    empty_token = { "http://localhost:3000/#access_token=" },
    other_params = { "http://localhost:3000/#state=abc" },
)]
fn test_from_callback_missing_token(url: &str) {
    assert!(matches!(
        Credentials::from_callback(url),
        Err(Error::CallbackMissingToken)
    ));
}

#[test]
fn test_save_load_clear() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cfg").join("session.json");

    assert_eq!(Credentials::load(&path).unwrap(), None);

    let creds = Credentials {
        access_token: "at".to_string(),
        refresh_token: Some("rt".to_string()),
        expires_at: None,
    };
    creds.save(&path).unwrap();
    assert_eq!(Credentials::load(&path).unwrap(), Some(creds));

    Credentials::clear(&path).unwrap();
    assert_eq!(Credentials::load(&path).unwrap(), None);
    Credentials::clear(&path).unwrap();
}

#[test]
fn test_debug_redacts_tokens() {
    let creds = Credentials {
        access_token: "secret-access".to_string(),
        refresh_token: Some("secret-refresh".to_string()),
        expires_at: Some(1),
    };
    let debug = format!("{creds:?}");
    assert!(!debug.contains("secret"));
    assert!(debug.contains("<redacted>"));
}
