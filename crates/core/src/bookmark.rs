// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bookmark records and their remote row encoding.
//!
//! Rows cross the wire as JSON objects with the columns
//! `id, title, url, created_at, user_id`. Decoding is strict: a row that is
//! missing a column or carries a wrong type is rejected rather than being
//! let into the local mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identity::UserId;

/// A raw remote row.
pub type Row = serde_json::Map<String, Value>;

/// Column holding the owning user's id.
pub const OWNER_COLUMN: &str = "user_id";

/// A bookmark as stored remotely. Server assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
}

impl Bookmark {
    /// Decodes a remote row.
    ///
    /// Numeric ids are accepted and rendered as strings.
    pub fn from_row(row: &Row) -> Result<Self> {
        let id = match row.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                return Err(Error::InvalidField {
                    kind: "bookmark",
                    field: "id",
                    reason: "expected a non-empty string".to_string(),
                })
            }
            None => {
                return Err(Error::MissingField {
                    kind: "bookmark",
                    field: "id",
                })
            }
        };

        let created_at = str_field(row, "created_at")?;
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map_err(|e| Error::InvalidTimestamp(format!("{created_at}: {e}")))?
            .with_timezone(&Utc);

        Ok(Bookmark {
            id,
            title: str_field(row, "title")?.to_string(),
            url: str_field(row, "url")?.to_string(),
            created_at,
            owner_id: UserId::new(str_field(row, OWNER_COLUMN)?),
        })
    }

    /// Encodes the bookmark as a remote row.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), Value::String(self.id.clone()));
        row.insert("title".into(), Value::String(self.title.clone()));
        row.insert("url".into(), Value::String(self.url.clone()));
        row.insert(
            "created_at".into(),
            Value::String(self.created_at.to_rfc3339()),
        );
        row.insert(
            OWNER_COLUMN.into(),
            Value::String(self.owner_id.as_str().to_string()),
        );
        row
    }

    /// First eight characters of the id, for compact display.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

fn str_field<'a>(row: &'a Row, field: &'static str) -> Result<&'a str> {
    match row.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Error::InvalidField {
            kind: "bookmark",
            field,
            reason: "expected a string".to_string(),
        }),
        None => Err(Error::MissingField {
            kind: "bookmark",
            field,
        }),
    }
}

/// Fields for a bookmark that does not exist yet.
///
/// Only constructible through [`NewBookmark::new`], so an insert can never be
/// issued with an empty title or url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    title: String,
    url: String,
    owner_id: UserId,
}

impl NewBookmark {
    /// Validates the user's input. Title is checked before url.
    ///
    /// A field holding only whitespace counts as empty, which is stricter
    /// than a plain emptiness check: `"  "` is rejected as a title.
    pub fn new(title: &str, url: &str, owner_id: &UserId) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::FieldEmpty { field: "title" });
        }
        if url.trim().is_empty() {
            return Err(Error::FieldEmpty { field: "url" });
        }
        Ok(NewBookmark {
            title: title.to_string(),
            url: url.to_string(),
            owner_id: owner_id.clone(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Insert payload. `id` and `created_at` are left to the server.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("title".into(), Value::String(self.title.clone()));
        row.insert("url".into(), Value::String(self.url.clone()));
        row.insert(
            OWNER_COLUMN.into(),
            Value::String(self.owner_id.as_str().to_string()),
        );
        row
    }
}

/// Result of decoding a query response.
#[derive(Debug, Default)]
pub struct Decoded {
    /// Well-formed records, in the order the remote returned them.
    pub records: Vec<Bookmark>,
    /// Rows that were dropped, with the reason.
    pub rejected: Vec<Error>,
}

/// Decodes every row, keeping the remote order and setting aside bad rows.
pub fn decode_rows(rows: Vec<Row>) -> Decoded {
    let mut decoded = Decoded::default();
    for row in &rows {
        match Bookmark::from_row(row) {
            Ok(bookmark) => decoded.records.push(bookmark),
            Err(e) => decoded.rejected.push(e),
        }
    }
    decoded
}

#[cfg(test)]
#[path = "bookmark_tests.rs"]
mod tests;
