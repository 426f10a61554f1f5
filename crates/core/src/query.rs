// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Query and filter descriptions for the remote collection.
//!
//! These are plain data; each store renders them into its own dialect
//! (`order=created_at.desc`, `id=eq.b1`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::bookmark::Row;

/// Name of the remote bookmark table.
pub const BOOKMARKS: &str = "bookmarks";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Ordering clause for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn descending(column: &str) -> Self {
        Order {
            column: column.to_string(),
            direction: Direction::Descending,
        }
    }

    pub fn ascending(column: &str) -> Self {
        Order {
            column: column.to_string(),
            direction: Direction::Ascending,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.column, self.direction.as_str())
    }
}

/// A select over one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    pub order: Option<Order>,
}

impl Query {
    pub fn new(table: &str) -> Self {
        Query {
            table: table.to_string(),
            order: None,
        }
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// All visible bookmarks, newest first.
    pub fn bookmarks_newest_first() -> Self {
        Query::new(BOOKMARKS).order_by(Order::descending("created_at"))
    }
}

/// Row predicate. Only equality is needed by this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<String>) -> Self {
        Filter::Eq {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } => column,
        }
    }

    /// Operator and operand as a query-string value, e.g. `eq.b1`.
    pub fn operand(&self) -> String {
        match self {
            Filter::Eq { value, .. } => format!("eq.{value}"),
        }
    }

    /// Tests a row. Numbers compare by their decimal rendering.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq { column, value } => match row.get(column) {
                Some(Value::String(s)) => s == value,
                Some(Value::Number(n)) => n.to_string() == *value,
                Some(Value::Bool(b)) => b.to_string() == *value,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Filter {
    /// Change-feed filter syntax: `column=eq.value`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column(), self.operand())
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
