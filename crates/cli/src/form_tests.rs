// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use super::*;
use crate::remote::{MemoryBackend, MemoryStore, Operation, RemoteError};
use smark_core::Identity;

fn core(backend: &MemoryBackend) -> SyncCore<MemoryStore> {
    let me = Identity::new("u-1", "me@example.com");
    SyncCore::new(Arc::new(backend.client(Some(me.clone()))), me)
}

#[tokio::test]
async fn successful_submit_clears_inputs() {
    let backend = MemoryBackend::new();
    let core = core(&backend);
    let mut form = BookmarkForm::new("Rust", "https://rust-lang.org");

    form.submit(&core).await.unwrap();
    assert!(form.is_empty());
    assert_eq!(form, BookmarkForm::default());
    assert_eq!(core.bookmarks()[0].title, "Rust");
}

#[tokio::test]
async fn invalid_submit_keeps_inputs() {
    let backend = MemoryBackend::new();
    let core = core(&backend);
    let mut form = BookmarkForm::new("only a title", "");

    let err = form.submit(&core).await.unwrap_err();
    assert_eq!(err.notice(), "Fill all fields");
    assert_eq!(form.title, "only a title");
    assert_eq!(core.store().calls(Operation::Insert), 0);
}

#[tokio::test]
async fn remote_failure_keeps_inputs() {
    let backend = MemoryBackend::new();
    let core = core(&backend);
    core.store()
        .fail(Operation::Insert, RemoteError::Network("offline".into()));
    let mut form = BookmarkForm::new("t", "https://t");

    assert!(form.submit(&core).await.is_err());
    assert_eq!(form, BookmarkForm::new("t", "https://t"));
    assert!(backend.all_rows().is_empty());
}

#[test]
fn whitespace_counts_as_empty() {
    assert!(BookmarkForm::new("  ", "\t").is_empty());
    assert!(!BookmarkForm::new("a", "").is_empty());
}
