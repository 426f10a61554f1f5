// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use smark::Cli;
use tracing_subscriber::EnvFilter;

/// Log filter used when `SMARK_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

fn main() {
    let filter = smark::env::log_filter()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = smark::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
