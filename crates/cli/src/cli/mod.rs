// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub use args::{OutputArgs, OutputFormat, SignInArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "smark")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Personal bookmarks, synced live across your sessions")]
#[command(
    long_about = "Personal bookmarks, synced live across your sessions.\n\n\
    Sign in once, then add, list and delete bookmarks. Every session of the same \
    account sees changes as they happen."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Use a throwaway in-memory store instead of the hosted project
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print version
    #[arg(short = 'v', short_alias = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List your bookmarks, newest first
    #[command(after_help = colors::examples("\
Examples:
  smark list                 Show bookmarks as text
  smark list -o json         Show bookmarks as JSON"))]
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Add a bookmark
    #[command(after_help = colors::examples("\
Examples:
  smark add \"Rust\" https://rust-lang.org   Save a bookmark"))]
    Add {
        /// Bookmark title
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Bookmark URL
        #[arg(value_parser = non_empty_string)]
        url: String,
    },

    /// Delete bookmark(s)
    #[command(after_help = colors::examples("\
Examples:
  smark rm 3f2a9c1e          Delete by ID prefix
  smark rm <id> <id>         Delete several"))]
    Rm {
        /// Bookmark IDs or unique ID prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Follow your bookmarks live until interrupted
    Watch,

    /// Sign in
    #[command(after_help = colors::examples("\
Examples:
  smark login                            Print the sign-in URL
  smark login --provider github          Use another provider
  smark login --callback \"<url>\"         Finish sign-in from the redirect URL"))]
    Login {
        #[command(flatten)]
        sign_in: SignInArgs,

        /// The full URL the browser was redirected to after sign-in
        #[arg(long, value_name = "url")]
        callback: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show who is signed in
    Whoami {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Write the script to the data directory instead of stdout
        #[arg(long)]
        install: bool,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
