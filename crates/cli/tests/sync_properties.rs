// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end behavior of the sync core against the in-memory backend,
//! driven only through the public library API.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use smark::remote::{MemoryBackend, Operation, RemoteError, RemoteStore};
use smark::session::ActiveSession;
use smark::sync::{SyncCore, SyncError};
use smark_core::{Query, OWNER_COLUMN};

const CHANNEL: &str = "realtime-bookmarks";

async fn converge(core: &SyncCore<smark::remote::MemoryStore>, title: &str, present: bool) {
    let mut rx = core.watch();
    tokio::time::timeout(
        Duration::from_secs(2),
        rx.wait_for(|s| s.bookmarks.iter().any(|b| b.title == title) == present),
    )
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn mirror_only_ever_holds_own_bookmarks() {
    let backend = MemoryBackend::new();
    backend.seed(&bob().id, "bob's", "https://bob.example.com");

    let core = core_for(&backend, alice());
    core.refresh().await.unwrap();
    core.add("mine", "https://alice.example.com").await.unwrap();

    let mirror = core.bookmarks();
    assert_eq!(mirror.len(), 1);
    assert!(mirror.iter().all(|b| b.owner_id == alice().id));

    // The stored row carries the owner, and other readers cannot see it.
    let rows = backend.all_rows();
    assert!(rows
        .iter()
        .any(|r| r[OWNER_COLUMN] == alice().id.as_str() && r["title"] == "mine"));
    let bobs = backend.client(Some(bob()));
    let visible = bobs.query(Query::bookmarks_newest_first()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["title"], "bob's");
}

#[tokio::test]
async fn mirror_is_newest_first() {
    let backend = MemoryBackend::new();
    let core = core_for(&backend, alice());
    for (title, url) in [("a", "https://a"), ("b", "https://b"), ("c", "https://c")] {
        core.add(title, url).await.unwrap();
    }

    assert_eq!(titles(&core), vec!["c", "b", "a"]);
    let stamps: Vec<_> = core.bookmarks().iter().map(|b| b.created_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn blank_input_never_reaches_the_remote() {
    let backend = MemoryBackend::new();
    let core = core_for(&backend, alice());

    for (title, url) in [("", "https://x"), ("x", ""), ("   ", "\t")] {
        let err = core.add(title, url).await.unwrap_err();
        assert!(matches!(err, SyncError::Invalid(_)));
        assert_eq!(err.notice(), "Fill all fields");
    }
    assert_eq!(core.store().calls(Operation::Insert), 0);
    assert!(backend.all_rows().is_empty());
}

#[tokio::test]
async fn add_refreshes_exactly_once() {
    let backend = MemoryBackend::new();
    let core = core_for(&backend, alice());

    core.add("Docs", "https://docs.example.com").await.unwrap();

    assert_eq!(core.store().calls(Operation::Insert), 1);
    assert_eq!(core.store().calls(Operation::Query), 1);
    let head = &core.bookmarks()[0];
    assert!(!head.id.is_empty());
    assert_eq!(head.owner_id, alice().id);
}

#[tokio::test]
async fn failed_insert_leaves_mirror_untouched() {
    let backend = MemoryBackend::new();
    backend.seed(&alice().id, "kept", "https://kept");
    let core = core_for(&backend, alice());
    core.refresh().await.unwrap();

    core.store()
        .fail(Operation::Insert, RemoteError::Network("connection reset".into()));
    let err = core.add("lost", "https://lost").await.unwrap_err();

    assert!(err.remote().is_some());
    assert_eq!(titles(&core), vec!["kept"]);
    assert_eq!(core.store().calls(Operation::Query), 1);
    assert_eq!(core.snapshot().notice.as_deref(), Some("Could not add bookmark"));
}

#[tokio::test]
async fn remove_is_idempotent() {
    let backend = MemoryBackend::new();
    let core = core_for(&backend, alice());
    core.add("gone soon", "https://g").await.unwrap();
    let id = core.bookmarks()[0].id.clone();

    core.remove(&id).await.unwrap();
    core.remove(&id).await.unwrap();
    core.remove("never-existed").await.unwrap();

    assert!(core.bookmarks().is_empty());
}

#[tokio::test]
async fn cannot_remove_someone_elses_bookmark() {
    let backend = MemoryBackend::new();
    let theirs = backend.seed(&bob().id, "bob's", "https://b");
    let core = core_for(&backend, alice());

    core.remove(&theirs.id).await.unwrap();
    assert_eq!(backend.all_rows().len(), 1);
}

#[tokio::test]
async fn two_sessions_of_one_user_converge() {
    let backend = MemoryBackend::new();
    let tab_a = ActiveSession::bind(Arc::new(backend.client(Some(alice()))), alice(), CHANNEL).await;
    let tab_b = ActiveSession::bind(Arc::new(backend.client(Some(alice()))), alice(), CHANNEL).await;
    assert!(tab_a.is_live() && tab_b.is_live());
    assert_eq!(backend.live_subscriptions(), 2);

    tab_a.core().add("shared", "https://shared").await.unwrap();
    converge(tab_b.core(), "shared", true).await;

    let id = tab_b.core().bookmarks()[0].id.clone();
    tab_b.core().remove(&id).await.unwrap();
    converge(tab_a.core(), "shared", false).await;

    tab_a.deactivate().await.unwrap();
    tab_b.deactivate().await.unwrap();
    assert_eq!(backend.live_subscriptions(), 0);
}

#[tokio::test]
async fn other_users_do_not_see_each_other() {
    let backend = MemoryBackend::new();
    let mine = ActiveSession::bind(Arc::new(backend.client(Some(alice()))), alice(), CHANNEL).await;
    let theirs = ActiveSession::bind(Arc::new(backend.client(Some(bob()))), bob(), CHANNEL).await;

    theirs.core().add("private", "https://p").await.unwrap();
    mine.core().add("mine", "https://m").await.unwrap();
    settle().await;

    assert_eq!(titles(mine.core()), vec!["mine"]);
    assert_eq!(titles(theirs.core()), vec!["private"]);

    mine.deactivate().await.unwrap();
    theirs.deactivate().await.unwrap();
}

#[tokio::test]
async fn add_then_remove_round_trip() {
    let backend = MemoryBackend::new();
    let user = smark_core::Identity::new("u1", "a@x.com");
    let core = core_for(&backend, user.clone());
    core.refresh().await.unwrap();

    core.add("Docs", "https://docs.example.com").await.unwrap();
    let list = core.bookmarks();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Docs");
    assert_eq!(list[0].url, "https://docs.example.com");
    assert_eq!(list[0].owner_id, user.id);

    core.remove(&list[0].id).await.unwrap();
    assert!(core.bookmarks().is_empty());
    assert!(core.snapshot().notice.is_none());
}

#[tokio::test]
async fn session_survives_lost_subscription() {
    let backend = MemoryBackend::new();
    backend.seed(&alice().id, "still here", "https://s");
    let store = Arc::new(backend.client(Some(alice())));
    store.fail(Operation::Subscribe, RemoteError::Network("refused".into()));

    let session = ActiveSession::bind(store, alice(), CHANNEL).await;
    assert!(!session.is_live());
    assert_eq!(titles(session.core()), vec!["still here"]);

    session.core().add("added anyway", "https://a").await.unwrap();
    assert_eq!(titles(session.core()), vec!["added anyway", "still here"]);
    session.deactivate().await.unwrap();
}
