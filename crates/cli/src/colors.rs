// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use crate::env;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers and the welcome line: steel blue
    pub const HEADER: u8 = 74;
    /// Titles and commands: light grey
    pub const LITERAL: u8 = 250;
    /// URLs, ids and hints: medium grey
    pub const CONTEXT: u8 = 245;
    /// Notices: soft amber
    pub const NOTICE: u8 = 179;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

const RESET: &str = "\x1b[0m";

/// Applies a 256-color foreground, or returns `text` unchanged when
/// `enabled` is false.
pub fn paint(code: u8, text: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text, should_colorize())
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text, should_colorize())
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text, should_colorize())
}

/// Colorize an examples help block.
///
/// Lines ending in `:` are headers. In `command  description` lines the
/// command part is a literal and any `<placeholder>` in it is context.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            if trimmed.ends_with(':') && !trimmed.contains("  ") {
                return format!("{indent}{}", header(trimmed));
            }
            match find_description_start(trimmed) {
                Some(end) => format!(
                    "{indent}{}{}",
                    colorize_command(&trimmed[..end]),
                    &trimmed[end..]
                ),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Colors a command line: words as literals, `<placeholders>` and quoted
/// strings as context.
pub fn colorize_command(cmd: &str) -> String {
    cmd.split(' ')
        .map(|word| {
            let is_value = (word.starts_with('<') && word.ends_with('>'))
                || (word.starts_with('"') && word.ends_with('"') && word.len() > 1);
            if word.is_empty() {
                String::new()
            } else if is_value {
                context(word)
            } else {
                literal(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Byte offset where the description starts: the first run of two or more
/// spaces that is followed by more text.
pub fn find_description_start(line: &str) -> Option<usize> {
    let start = line.find("  ")?;
    let rest = &line[start..];
    if rest.trim_start().is_empty() {
        None
    } else {
        Some(start)
    }
}

#[cfg(test)]
#[path = "colors_tests.rs"]
pub(crate) mod tests;
