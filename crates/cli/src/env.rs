// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns `true` if `NO_COLOR=1`.
pub fn no_color() -> bool {
    std::env::var(vars::NO_COLOR).is_ok_and(|v| v == "1")
}

/// Returns `true` if `COLOR=1`.
pub fn force_color() -> bool {
    std::env::var(vars::COLOR).is_ok_and(|v| v == "1")
}

/// Returns the value of `SMARK_CONFIG_DIR` if set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var(vars::SMARK_CONFIG_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `SMARK_URL` if set and non-empty.
pub fn project_url() -> Option<String> {
    non_empty(vars::SMARK_URL)
}

/// Returns the value of `SMARK_ANON_KEY` if set and non-empty.
pub fn anon_key() -> Option<String> {
    non_empty(vars::SMARK_ANON_KEY)
}

/// Returns the log filter directive from `SMARK_LOG` if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::SMARK_LOG)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
