// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for smark-core operations.

use thiserror::Error;

/// All possible errors that can occur in smark-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{field} cannot be empty\n  hint: fill all fields")]
    FieldEmpty { field: &'static str },

    #[error("missing field '{field}' in remote {kind}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("invalid field '{field}' in remote {kind}: {reason}")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unexpected frame: {0}")]
    UnexpectedFrame(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for smark-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
