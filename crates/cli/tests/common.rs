// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::Arc;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use smark::remote::{MemoryBackend, MemoryStore};
use smark::sync::SyncCore;
use smark_core::Identity;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The binary, isolated from the caller's project settings and session.
pub fn smark(config_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("smark");
    cmd.env("SMARK_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1")
        .env_remove("SMARK_URL")
        .env_remove("SMARK_ANON_KEY")
        .env_remove("SMARK_LOG")
        .env_remove("COLOR");
    cmd
}

pub fn alice() -> Identity {
    Identity::new("u-alice", "alice@example.com")
}

pub fn bob() -> Identity {
    Identity::new("u-bob", "bob@example.com")
}

/// A sync core over a new client of `backend`.
pub fn core_for(backend: &MemoryBackend, identity: Identity) -> Arc<SyncCore<MemoryStore>> {
    let store = Arc::new(backend.client(Some(identity.clone())));
    Arc::new(SyncCore::new(store, identity))
}

pub fn titles(core: &SyncCore<MemoryStore>) -> Vec<String> {
    core.bookmarks().into_iter().map(|b| b.title).collect()
}

/// Lets spawned event forwarders run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
