// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Mutex;
use std::time::Duration;

use super::*;
use crate::commands::tests::testing::{ada, connect};
use crate::remote::{MemoryBackend, Operation, RemoteError};
use crate::sync::SyncCore;

/// Output buffer readable while the view is still writing to it.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        crate::colors::tests::strip_ansi(&String::from_utf8_lossy(&self.0.lock().unwrap()))
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn reprints_on_change_from_another_session() {
    let backend = MemoryBackend::new();
    let (conn, _) = connect(&backend, Some(ada()));
    let other = SyncCore::new(Arc::new(backend.client(Some(ada()))), ada());

    let buf = SharedBuf::default();
    let probe = buf.clone();
    let stop = async {
        other.add("from elsewhere", "https://e").await.unwrap();
        while !probe.contents().contains("from elsewhere") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };

    let mut writer = buf.clone();
    tokio::time::timeout(Duration::from_secs(5), run_until(&conn, &mut writer, stop))
        .await
        .expect("view converged")
        .unwrap();

    let text = buf.contents();
    let empty = text.find("No bookmarks yet.").unwrap();
    let separator = text.find(SEPARATOR).unwrap();
    let entry = text.find("from elsewhere").unwrap();
    assert!(empty < separator && separator < entry);
    assert_eq!(backend.live_subscriptions(), 0);
}

#[tokio::test]
async fn shows_snapshot_when_subscribe_fails() {
    let backend = MemoryBackend::new();
    backend.seed(&ada().id, "saved", "https://s");
    let (conn, store) = connect(&backend, Some(ada()));
    store.fail(Operation::Subscribe, RemoteError::Closed);

    let mut buf = SharedBuf::default();
    run_until(&conn, &mut buf, async {}).await.unwrap();

    let text = buf.contents();
    assert!(text.starts_with("! Live updates unavailable"));
    assert!(text.contains("saved"));
    assert_eq!(store.calls(Operation::Unsubscribe), 0);
}

#[tokio::test]
async fn requires_sign_in() {
    let backend = MemoryBackend::new();
    let (conn, store) = connect(&backend, None);
    let err = run_until(&conn, &mut SharedBuf::default(), async {})
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::Error::NotSignedIn));
    assert_eq!(store.calls(Operation::Subscribe), 0);
}
