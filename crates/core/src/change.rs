// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Change notifications from the remote collection.
//!
//! The client treats every event purely as a refresh trigger, but the events
//! still carry the affected rows so stores can route them by owner.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::bookmark::{Row, OWNER_COLUMN};
use crate::identity::UserId;
use crate::query::{Filter, BOOKMARKS};

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One insert, update or delete on a remote table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub table: String,
    /// New row image (insert, update).
    pub record: Option<Row>,
    /// Previous row image (update, delete). May hold only the primary key.
    pub old_record: Option<Row>,
}

impl ChangeEvent {
    pub fn insert(table: &str, record: Row) -> Self {
        ChangeEvent {
            kind: ChangeKind::Insert,
            table: table.to_string(),
            record: Some(record),
            old_record: None,
        }
    }

    pub fn delete(table: &str, old_record: Row) -> Self {
        ChangeEvent {
            kind: ChangeKind::Delete,
            table: table.to_string(),
            record: None,
            old_record: Some(old_record),
        }
    }

    /// Owner of the affected row, read from whichever image is present.
    pub fn owner(&self) -> Option<UserId> {
        self.record
            .iter()
            .chain(self.old_record.iter())
            .find_map(|row| match row.get(OWNER_COLUMN) {
                Some(Value::String(s)) => Some(UserId::new(s.as_str())),
                _ => None,
            })
    }
}

/// Which events a change subscription wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Channel name, unique per client connection.
    pub name: String,
    pub schema: String,
    pub table: String,
    /// `None` means every kind.
    pub kind: Option<ChangeKind>,
    pub filter: Option<Filter>,
}

impl ChannelSpec {
    /// Every change on the bookmark table owned by `owner`.
    pub fn bookmarks_for(name: &str, owner: &UserId) -> Self {
        ChannelSpec {
            name: name.to_string(),
            schema: "public".to_string(),
            table: BOOKMARKS.to_string(),
            kind: None,
            filter: Some(Filter::eq(OWNER_COLUMN, owner.as_str())),
        }
    }

    /// Event selector in feed syntax: `*` or a kind.
    pub fn event_selector(&self) -> &'static str {
        self.kind.map_or("*", |k| k.as_str())
    }

    /// Tests whether an event falls under this subscription.
    ///
    /// The filter is checked against either row image, so deletes whose old
    /// image carries the owner still match.
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if event.table != self.table {
            return false;
        }
        if self.kind.is_some_and(|k| k != event.kind) {
            return false;
        }
        match &self.filter {
            None => true,
            Some(filter) => event
                .record
                .iter()
                .chain(event.old_record.iter())
                .any(|row| filter.matches(row)),
        }
    }
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
