// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `smark watch`: a live view of the list.
//!
//! Binds a session, prints the list, and prints it again after every
//! snapshot change until interrupted.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use crate::colors;
use crate::display;
use crate::error::Result;
use crate::session::ActiveSession;

use super::Connection;

const SEPARATOR: &str = "---";

pub async fn run(conn: &Connection, out: &mut dyn Write) -> Result<()> {
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for interrupt");
            std::future::pending::<()>().await;
        }
    };
    run_until(conn, out, interrupted).await
}

/// Runs the live view until `stop` resolves, then releases the session.
pub async fn run_until(
    conn: &Connection,
    out: &mut dyn Write,
    stop: impl Future<Output = ()>,
) -> Result<()> {
    let identity = conn.signed_in().await?;
    let channel = conn.config().realtime.channel.clone();
    let session = ActiveSession::bind(Arc::clone(conn.store()), identity, &channel).await;
    let color = colors::should_colorize();

    if !session.is_live() {
        writeln!(
            out,
            "{}",
            display::format_notice("Live updates unavailable; showing a snapshot", color)
        )?;
    }

    let mut updates = session.core().watch();
    let snapshot = updates.borrow_and_update().clone();
    writeln!(out, "{}", display::render(&snapshot, session.identity(), color))?;
    out.flush()?;

    tokio::pin!(stop);
    loop {
        tokio::select! {
            () = &mut stop => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                writeln!(out, "{SEPARATOR}")?;
                writeln!(out, "{}", display::render(&snapshot, session.identity(), color))?;
                out.flush()?;
            }
        }
    }

    session.deactivate().await?;
    tracing::debug!("watch stopped");
    Ok(())
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
