// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    let header = fg(colors::codes::HEADER);
    let context = fg(colors::codes::CONTEXT);

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(fg(colors::codes::LITERAL))
        .placeholder(context)
        .valid(context)
        .error(fg(colors::codes::NOTICE))
}

/// Main help template with the commands list ahead of options.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    format!(
        "\
{bookmarks}
  {list}        List your bookmarks, newest first
  {add}         Add a bookmark
  {rm}          Delete bookmark(s)
  {watch}       Follow your bookmarks live

{account}
  {login}       Sign in with your identity provider
  {logout}      Sign out
  {whoami}      Show who is signed in
  {completion}  Generate shell completions",
        bookmarks = colors::header("Bookmarks:"),
        account = colors::header("Account:"),
        list = colors::literal("list"),
        add = colors::literal("add"),
        rm = colors::literal("rm"),
        watch = colors::literal("watch"),
        login = colors::literal("login"),
        logout = colors::literal("logout"),
        whoami = colors::literal("whoami"),
        completion = colors::literal("completion"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  smark login                        Sign in
  smark add \"Rust\" <url>             Save a bookmark
  smark list                         Show your bookmarks
  smark --offline list               Try it without an account",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
