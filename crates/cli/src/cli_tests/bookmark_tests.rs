// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn list_defaults_to_text() {
    let cli = parse(&["smark", "list"]).unwrap();
    assert!(!cli.offline);
    assert!(matches!(
        cli.command,
        Command::List {
            output: OutputArgs {
                output: OutputFormat::Text
            }
        }
    ));
}

#[parameterized(
    short = { &["smark", "list", "-o", "json"] },
    long = { &["smark", "list", "--output", "json"] },
)]
fn list_json(args: &[&str]) {
    let cli = parse(args).unwrap();
    assert!(matches!(
        cli.command,
        Command::List {
            output: OutputArgs {
                output: OutputFormat::Json
            }
        }
    ));
}

#[test]
fn add_takes_title_and_url() {
    let cli = parse(&["smark", "add", "Rust", "https://rust-lang.org"]).unwrap();
    match cli.command {
        Command::Add { title, url } => {
            assert_eq!(title, "Rust");
            assert_eq!(url, "https://rust-lang.org");
        }
        other => unreachable!("parsed {other:?}"),
    }
}

#[parameterized(
    missing_url = { &["smark", "add", "only"] },
    blank_title = { &["smark", "add", "  ", "https://x"] },
    blank_url = { &["smark", "add", "t", ""] },
    rm_without_ids = { &["smark", "rm"] },
    list_bad_format = { &["smark", "list", "-o", "yaml"] },
)]
fn rejected(args: &[&str]) {
    assert!(parse(args).is_err());
}

#[test]
fn rm_takes_many_ids() {
    let cli = parse(&["smark", "rm", "a1", "b2", "c3"]).unwrap();
    match cli.command {
        Command::Rm { ids } => assert_eq!(ids, vec!["a1", "b2", "c3"]),
        other => unreachable!("parsed {other:?}"),
    }
}

#[parameterized(
    before = { &["smark", "--offline", "list"] },
    after = { &["smark", "list", "--offline"] },
)]
fn offline_is_global(args: &[&str]) {
    assert!(parse(args).unwrap().offline);
}

#[test]
fn watch_has_no_arguments() {
    assert!(matches!(parse(&["smark", "watch"]).unwrap().command, Command::Watch));
    assert!(parse(&["smark", "watch", "extra"]).is_err());
}
