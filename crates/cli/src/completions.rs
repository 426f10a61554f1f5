// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shell completion scripts for smark.
//!
//! `smark completion <shell>` prints the script; `--install` writes it to
//! `<data dir>/smark/completions/` and prints the path to source.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::error::{Error, Result};

const BIN_NAME: &str = "smark";

/// Completion script filename for `shell`.
pub fn script_filename(shell: Shell) -> String {
    match shell {
        Shell::Bash => "smark.bash".to_string(),
        Shell::Zsh => "_smark".to_string(),
        Shell::Fish => "smark.fish".to_string(),
        Shell::PowerShell => "_smark.ps1".to_string(),
        Shell::Elvish => "smark.elv".to_string(),
        other => format!("smark.{other}"),
    }
}

/// Writes the completion script for `shell` to `out`.
pub fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

/// Default directory for installed scripts.
pub fn completions_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smark/completions"))
}

/// Writes the script for `shell` into `dir`, replacing any previous one.
pub fn install(shell: Shell, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(script_filename(shell));
    let mut file = fs::File::create(&path)?;
    write_script(shell, &mut file);
    file.flush()?;
    tracing::debug!(path = %path.display(), "completion script written");
    Ok(path)
}

/// Installs into [`completions_dir`].
pub fn install_default(shell: Shell) -> Result<PathBuf> {
    let dir =
        completions_dir().ok_or_else(|| Error::Config("Cannot determine data directory".into()))?;
    install(shell, &dir)
}

#[cfg(test)]
#[path = "completions_tests.rs"]
mod tests;
