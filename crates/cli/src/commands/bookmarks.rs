// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::sync::Arc;

use smark_core::Bookmark;

use crate::cli::OutputFormat;
use crate::colors;
use crate::display;
use crate::error::{Error, Result};
use crate::form::BookmarkForm;
use crate::remote::RemoteStore;
use crate::sync::SyncCore;

use super::Connection;

async fn loaded_core(conn: &Connection) -> Result<SyncCore<dyn RemoteStore>> {
    let identity = conn.signed_in().await?;
    let core = SyncCore::new(Arc::clone(conn.store()), identity);
    core.refresh().await?;
    Ok(core)
}

pub async fn list(conn: &Connection, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let core = loaded_core(conn).await?;
    match format {
        OutputFormat::Text => {
            let text = display::render(&core.snapshot(), core.identity(), colors::should_colorize());
            writeln!(out, "{text}")?;
        }
        OutputFormat::Json => writeln!(out, "{}", display::render_json(&core.bookmarks())?)?,
    }
    Ok(())
}

pub async fn add(conn: &Connection, title: &str, url: &str, out: &mut dyn Write) -> Result<()> {
    let identity = conn.signed_in().await?;
    let core = SyncCore::new(Arc::clone(conn.store()), identity);
    let mut form = BookmarkForm::new(title, url);
    form.submit(&core).await?;

    // The refresh after the insert may have failed; the insert itself stands.
    match core
        .bookmarks()
        .iter()
        .find(|b| b.title == title && b.url == url)
    {
        Some(added) => writeln!(out, "Added {} {}", added.short_id(), added.title)?,
        None => writeln!(out, "Added {title}")?,
    }
    Ok(())
}

/// Deletes each of `ids`, continuing past failures.
pub async fn remove(conn: &Connection, ids: &[String], out: &mut dyn Write) -> Result<()> {
    let core = loaded_core(conn).await?;
    let bookmarks = core.bookmarks();

    let mut succeeded = 0;
    let mut unknown_ids = Vec::new();
    let mut last_error = None;

    for partial in ids {
        let result = match resolve_id(&bookmarks, partial) {
            Ok(bookmark) => match core.remove(&bookmark.id).await {
                Ok(()) => Ok(bookmark),
                Err(e) => Err(Error::from(e)),
            },
            Err(e) => {
                if matches!(e, Error::BookmarkNotFound(_)) {
                    unknown_ids.push(partial.clone());
                }
                Err(e)
            }
        };
        match result {
            Ok(bookmark) => {
                succeeded += 1;
                writeln!(out, "Deleted {}", bookmark.short_id())?;
            }
            Err(e) => {
                tracing::warn!(id = %partial, error = %e, "delete failed");
                last_error = Some(e);
            }
        }
    }

    let failed = ids.len() - succeeded;
    match last_error {
        None => Ok(()),
        Some(e) if ids.len() == 1 => Err(e),
        Some(_) => Err(Error::PartialBulkFailure {
            succeeded,
            failed,
            unknown_ids,
        }),
    }
}

/// Resolves a full id or unique id prefix against `bookmarks`.
pub fn resolve_id<'a>(bookmarks: &'a [Bookmark], partial: &str) -> Result<&'a Bookmark> {
    if let Some(exact) = bookmarks.iter().find(|b| b.id == partial) {
        return Ok(exact);
    }
    let matches: Vec<&Bookmark> = bookmarks
        .iter()
        .filter(|b| b.id.starts_with(partial))
        .collect();
    match matches.as_slice() {
        [] => Err(Error::BookmarkNotFound(partial.to_string())),
        [only] => Ok(*only),
        _ => Err(Error::AmbiguousId {
            prefix: partial.to_string(),
            matches: matches.iter().map(|b| b.id.clone()).collect(),
        }),
    }
}

#[cfg(test)]
#[path = "bookmarks_tests.rs"]
mod tests;
