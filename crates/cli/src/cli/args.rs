// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::{Args, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// `-o/--output` for commands that print records.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, short, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// Overrides for how sign-in is started.
#[derive(Args, Clone, Debug, Default)]
pub struct SignInArgs {
    /// OAuth provider (defaults to the configured provider)
    #[arg(long, value_name = "name")]
    pub provider: Option<String>,

    /// Where the provider redirects after sign-in
    #[arg(long, value_name = "url")]
    pub redirect_to: Option<String>,
}
