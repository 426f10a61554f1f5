// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated principal for a session.
//!
//! The identity is owned by the remote auth service; this crate only decodes
//! it and hands out read-only copies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Unique identifier of a remote user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// The signed-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Identity {
            id: UserId::new(id),
            email: email.into(),
        }
    }

    /// Decodes a user object returned by the auth endpoint.
    ///
    /// Extra fields (metadata, factors, timestamps) are ignored. `id` must be
    /// a non-empty string and `email` must be present.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let id = value
            .get("id")
            .ok_or(Error::MissingField {
                kind: "user",
                field: "id",
            })?
            .as_str()
            .ok_or_else(|| Error::InvalidField {
                kind: "user",
                field: "id",
                reason: "expected a string".to_string(),
            })?;
        if id.is_empty() {
            return Err(Error::InvalidField {
                kind: "user",
                field: "id",
                reason: "empty".to_string(),
            });
        }

        let email = match value.get("email") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => {
                return Err(Error::MissingField {
                    kind: "user",
                    field: "email",
                })
            }
            Some(_) => {
                return Err(Error::InvalidField {
                    kind: "user",
                    field: "email",
                    reason: "expected a string".to_string(),
                })
            }
        };

        Ok(Identity::new(id, email))
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
