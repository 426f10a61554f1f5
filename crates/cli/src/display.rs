// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of the bookmark list.
//!
//! Output format:
//! ```text
//! Welcome, ada@example.com
//!
//! - 3f2a9c1e Rust
//!     https://rust-lang.org
//!     2026-10-19 10:30
//!
//! ! Could not load bookmarks
//! ```

use smark_core::{Bookmark, Identity};

use crate::colors::{self, codes};
use crate::error::Result;
use crate::sync::Snapshot;

/// Shown in place of the list when it is empty.
pub const EMPTY_LIST: &str = "No bookmarks yet.";

/// Greeting line for the signed-in user.
pub fn welcome(identity: &Identity, color: bool) -> String {
    format!(
        "{} {}",
        colors::paint(codes::HEADER, "Welcome,", color),
        identity.email
    )
}

/// Format a single bookmark entry.
pub fn format_bookmark(bookmark: &Bookmark, color: bool) -> Vec<String> {
    vec![
        format!(
            "- {} {}",
            colors::paint(codes::CONTEXT, bookmark.short_id(), color),
            colors::paint(codes::LITERAL, &bookmark.title, color)
        ),
        format!("    {}", bookmark.url),
        format!(
            "    {}",
            colors::paint(
                codes::CONTEXT,
                &bookmark.created_at.format("%Y-%m-%d %H:%M").to_string(),
                color
            )
        ),
    ]
}

/// Format the list, newest first as given, or the empty marker.
pub fn format_list(bookmarks: &[Bookmark], color: bool) -> String {
    if bookmarks.is_empty() {
        return EMPTY_LIST.to_string();
    }
    bookmarks
        .iter()
        .map(|b| format_bookmark(b, color).join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a notice line.
pub fn format_notice(notice: &str, color: bool) -> String {
    colors::paint(codes::NOTICE, &format!("! {notice}"), color)
}

/// Full text view of a snapshot for `identity`.
pub fn render(snapshot: &Snapshot, identity: &Identity, color: bool) -> String {
    let mut out = vec![welcome(identity, color), String::new()];
    out.push(format_list(&snapshot.bookmarks, color));
    if let Some(notice) = &snapshot.notice {
        out.push(String::new());
        out.push(format_notice(notice, color));
    }
    out.join("\n")
}

/// JSON view of the list: an array of remote-shaped records.
pub fn render_json(bookmarks: &[Bookmark]) -> Result<String> {
    Ok(serde_json::to_string_pretty(bookmarks)?)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
