// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test helpers shared by the command tests.
pub(crate) mod testing {
    use super::*;
    use crate::remote::MemoryStore;

    pub fn ada() -> Identity {
        Identity::new("u-ada", "ada@example.com")
    }

    /// A connection over `backend`, signed in as `identity`.
    pub fn connect(backend: &MemoryBackend, identity: Option<Identity>) -> (Connection, Arc<MemoryStore>) {
        let store = Arc::new(backend.client(identity));
        let conn = Connection::with_store(Arc::clone(&store) as Arc<dyn RemoteStore>, Config::default());
        (conn, store)
    }

    pub fn config_for(server: &MockServer) -> Config {
        Config {
            url: Some(server.uri()),
            anon_key: Some("anon".to_string()),
            ..Config::default()
        }
    }
}

use testing::*;

#[tokio::test]
async fn offline_connection_is_signed_in() {
    let conn = Connection::offline(Config::default());
    let identity = conn.signed_in().await.unwrap();
    assert_eq!(identity.email, OFFLINE_EMAIL);
    assert_eq!(identity.id.as_str(), OFFLINE_USER_ID);

    let rows = conn.store().query(smark_core::Query::bookmarks_newest_first()).await.unwrap();
    assert_eq!(rows.len(), OFFLINE_SAMPLES.len());
    conn.persist().await.unwrap();
}

#[tokio::test]
async fn anonymous_connection_is_not_signed_in() {
    let backend = MemoryBackend::new();
    let (conn, _) = connect(&backend, None);
    assert!(matches!(conn.signed_in().await, Err(Error::NotSignedIn)));
}

#[tokio::test]
async fn persist_saves_refreshed_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "refresh_token": "rt-new"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "u-1", "email": "a@b.c"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let session_path = credentials_path(dir.path());
    let credentials = Credentials {
        access_token: "old".into(),
        refresh_token: Some("rt-old".into()),
        expires_at: None,
    };
    credentials.save(&session_path).unwrap();

    let config = config_for(&server);
    let http = Arc::new(
        HttpStore::new(
            config.http_settings().unwrap(),
            config.realtime_settings().unwrap(),
            Some(credentials.clone()),
        )
        .unwrap(),
    );
    let conn = Connection {
        store: Arc::clone(&http) as Arc<dyn RemoteStore>,
        config,
        saved: Some(SavedSession {
            http,
            path: session_path.clone(),
            credentials,
        }),
    };

    assert_eq!(conn.signed_in().await.unwrap().email, "a@b.c");
    conn.persist().await.unwrap();

    let saved = Credentials::load(&session_path).unwrap().unwrap();
    assert_eq!(saved.access_token, "new");
    assert_eq!(saved.refresh_token.as_deref(), Some("rt-new"));
}
