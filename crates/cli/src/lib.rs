// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! smark - Personal bookmarks, synced live across sessions.
//!
//! This crate provides the client library behind the `smark` CLI: a
//! synchronization core that mirrors the signed-in user's bookmarks from a
//! hosted backend and keeps every session of that user consistent.
//!
//! # Main Components
//!
//! - [`sync::SyncCore`] - the local mirror: refresh, add, remove, subscribe
//! - [`remote::RemoteStore`] - the backend seam, with [`remote::HttpStore`]
//!   for the hosted project and [`remote::MemoryBackend`] for tests and
//!   offline use
//! - [`session`] - activate, bind and deactivate a signed-in session
//! - [`Config`] and [`credentials::Credentials`] - project settings and the
//!   saved session
//! - [`Error`] - Error types for all operations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use smark::remote::MemoryBackend;
//! use smark::session::ActiveSession;
//!
//! let backend = MemoryBackend::new();
//! let store = Arc::new(backend.client(Some(identity.clone())));
//! let session = ActiveSession::bind(store, identity, "realtime-bookmarks").await;
//! session.core().add("Rust", "https://rust-lang.org").await?;
//! let list = session.core().bookmarks();
//! session.deactivate().await?;
//! ```

mod cli;
pub mod colors;
mod commands;
mod completions;
mod display;
pub mod env;
pub mod help;

pub mod config;
pub mod credentials;
pub mod error;
pub mod form;
pub mod remote;
pub mod session;
pub mod sync;

pub use cli::{Cli, Command, OutputArgs, OutputFormat, SignInArgs};
pub use config::Config;
pub use error::{Error, Result};

use commands::Connection;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut stdout = std::io::stdout();
    let out = &mut stdout;

    match cli.command {
        Command::Completion { shell, install } => {
            if install {
                let path = completions::install_default(shell)?;
                println!("Wrote {}", path.display());
                println!("Source it from your shell's startup file to enable completions.");
            } else {
                completions::write_script(shell, out);
            }
            Ok(())
        }
        Command::Login { sign_in, callback } => {
            if cli.offline {
                println!("Offline mode signs in as {} automatically", commands::OFFLINE_EMAIL);
                return Ok(());
            }
            let config = Config::load_default()?;
            let session_path = config::credentials_path(&config::config_dir());
            commands::auth::login(&config, &session_path, &sign_in, callback.as_deref(), out).await
        }
        Command::Logout => {
            if cli.offline {
                println!("Offline mode has no session to end");
                return Ok(());
            }
            let session_path = config::credentials_path(&config::config_dir());
            let conn = match Connection::open(false) {
                Ok(conn) => Some(conn),
                Err(Error::NotSignedIn) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "cannot reach project, signing out locally");
                    None
                }
            };
            commands::auth::logout(conn.as_ref(), &session_path, out).await
        }
        command => {
            let conn = Connection::open(cli.offline)?;
            let result = match command {
                Command::List { output } => commands::bookmarks::list(&conn, output.output, out).await,
                Command::Add { title, url } => commands::bookmarks::add(&conn, &title, &url, out).await,
                Command::Rm { ids } => commands::bookmarks::remove(&conn, &ids, out).await,
                Command::Watch => commands::watch::run(&conn, out).await,
                Command::Whoami { output } => commands::auth::whoami(&conn, output.output, out).await,
                Command::Completion { .. } | Command::Login { .. } | Command::Logout => Ok(()),
            };
            let persisted = conn.persist().await;
            result.and(persisted)
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
