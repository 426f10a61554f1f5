// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{TimeZone, Utc};
use smark_core::UserId;

fn bookmark(id: &str) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: id.to_uppercase(),
        url: format!("https://{id}.example"),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        owner_id: UserId::new("u1"),
    }
}

fn ids(mirror: &Mirror) -> Vec<String> {
    mirror
        .snapshot()
        .bookmarks
        .iter()
        .map(|b| b.id.clone())
        .collect()
}

#[test]
fn tickets_increase() {
    let mut mirror = Mirror::default();
    let a = mirror.issue();
    let b = mirror.issue();
    assert!(a < b);
}

#[test]
fn in_order_results_apply() {
    let mut mirror = Mirror::default();
    let a = mirror.issue();
    assert_eq!(mirror.apply(a, vec![bookmark("a")]), Applied::Fresh);
    let b = mirror.issue();
    assert_eq!(mirror.apply(b, vec![bookmark("b"), bookmark("a")]), Applied::Fresh);
    assert_eq!(ids(&mirror), vec!["b", "a"]);
}

#[test]
fn older_result_arriving_late_is_discarded() {
    let mut mirror = Mirror::default();
    let older = mirror.issue();
    let newer = mirror.issue();

    assert_eq!(mirror.apply(newer, vec![bookmark("new")]), Applied::Fresh);
    let version = mirror.snapshot().version;

    assert_eq!(mirror.apply(older, vec![bookmark("old")]), Applied::Stale);
    assert_eq!(ids(&mirror), vec!["new"]);
    assert_eq!(mirror.snapshot().version, version);
}

#[test]
fn same_ticket_applies_once() {
    let mut mirror = Mirror::default();
    let t = mirror.issue();
    assert_eq!(mirror.apply(t, vec![]), Applied::Fresh);
    assert_eq!(mirror.apply(t, vec![bookmark("x")]), Applied::Stale);
    assert!(mirror.snapshot().bookmarks.is_empty());
}

#[test]
fn notice_is_kept_until_a_fresh_apply() {
    let mut mirror = Mirror::default();
    let t = mirror.issue();
    mirror.apply(t, vec![bookmark("a")]);

    mirror.notify("Could not load bookmarks".to_string());
    assert_eq!(
        mirror.snapshot().notice.as_deref(),
        Some("Could not load bookmarks")
    );
    assert_eq!(ids(&mirror), vec!["a"]);

    let t = mirror.issue();
    mirror.apply(t, vec![bookmark("a")]);
    assert_eq!(mirror.snapshot().notice, None);
}

#[test]
fn every_change_bumps_version() {
    let mut mirror = Mirror::default();
    assert_eq!(mirror.snapshot().version, 0);
    let t = mirror.issue();
    mirror.apply(t, vec![]);
    mirror.notify("x".to_string());
    assert_eq!(mirror.snapshot().version, 2);
}
