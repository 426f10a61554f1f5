// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local mirror of the signed-in user's bookmarks.
//!
//! Refreshes can overlap (a user action and a change event may both start
//! one), and the network may answer them out of order. Every refresh takes
//! a [`Ticket`] before it queries; a result is applied only if its ticket is
//! newer than the last applied one, so an older reply never overwrites a
//! newer one.

use smark_core::Bookmark;

/// Orders refreshes by when they were issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Outcome of applying a refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result replaced the mirror.
    Fresh,
    /// A newer refresh was already applied; the result was discarded.
    Stale,
}

/// What observers see: the mirrored list plus the last surfaced problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Newest first, exactly as the remote ordered them.
    pub bookmarks: Vec<Bookmark>,
    /// Bumped on every change to the snapshot.
    pub version: u64,
    /// User-facing message for the most recent failure, cleared by a
    /// successful refresh.
    pub notice: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Mirror {
    issued: u64,
    applied: Option<Ticket>,
    snapshot: Snapshot,
}

impl Mirror {
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Replaces the mirror with `records` unless a newer ticket already landed.
    pub fn apply(&mut self, ticket: Ticket, records: Vec<Bookmark>) -> Applied {
        if self.applied.is_some_and(|last| ticket <= last) {
            return Applied::Stale;
        }
        self.applied = Some(ticket);
        self.snapshot.bookmarks = records;
        self.snapshot.notice = None;
        self.snapshot.version += 1;
        Applied::Fresh
    }

    /// True once a refresh issued after `ticket` has been applied.
    pub fn is_superseded(&self, ticket: Ticket) -> bool {
        self.applied.is_some_and(|last| last > ticket)
    }

    /// Records a failure without touching the list.
    pub fn notify(&mut self, notice: String) {
        self.snapshot.notice = Some(notice);
        self.snapshot.version += 1;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
