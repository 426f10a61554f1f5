// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The add-bookmark form.
//!
//! Holds the two inputs between edits. A successful submit clears both; a
//! failed one keeps them so the user can retry.

use crate::remote::RemoteStore;
use crate::sync::{SyncCore, SyncResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkForm {
    pub title: String,
    pub url: String,
}

impl BookmarkForm {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        BookmarkForm {
            title: title.into(),
            url: url.into(),
        }
    }

    /// True when both inputs are blank.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.url.trim().is_empty()
    }

    /// Submits the inputs through `core`.
    pub async fn submit<S: RemoteStore + ?Sized + 'static>(
        &mut self,
        core: &SyncCore<S>,
    ) -> SyncResult<()> {
        core.add(&self.title, &self.url).await?;
        self.title.clear();
        self.url.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;
