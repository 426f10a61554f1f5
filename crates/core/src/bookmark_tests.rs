// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

fn docs_row() -> Row {
    row(json!({
        "id": "b1",
        "title": "Docs",
        "url": "https://docs.example.com",
        "created_at": "2026-03-01T10:00:00.123456+00:00",
        "user_id": "u1"
    }))
}

#[test]
fn from_row_decodes_all_columns() {
    let bookmark = Bookmark::from_row(&docs_row()).unwrap();
    assert_eq!(bookmark.id, "b1");
    assert_eq!(bookmark.title, "Docs");
    assert_eq!(bookmark.url, "https://docs.example.com");
    assert_eq!(bookmark.owner_id, UserId::from("u1"));
    assert_eq!(bookmark.created_at.to_rfc3339(), "2026-03-01T10:00:00.123456+00:00");
}

#[test]
fn from_row_coerces_numeric_id() {
    let mut r = docs_row();
    r.insert("id".into(), json!(42));
    assert_eq!(Bookmark::from_row(&r).unwrap().id, "42");
}

#[test]
fn from_row_normalizes_offset_to_utc() {
    let mut r = docs_row();
    r.insert("created_at".into(), json!("2026-03-01T12:00:00+02:00"));
    let bookmark = Bookmark::from_row(&r).unwrap();
    assert_eq!(bookmark.created_at.to_rfc3339(), "2026-03-01T10:00:00+00:00");
}

#[parameterized(
    missing_id = { "id", None },
    empty_id = { "id", Some(json!("")) },
    bool_id = { "id", Some(json!(true)) },
    missing_title = { "title", None },
    numeric_url = { "url", Some(json!(1)) },
    bad_timestamp = { "created_at", Some(json!("yesterday")) },
    missing_owner = { "user_id", None },
)]
fn from_row_rejects_malformed(column: &str, value: Option<Value>) {
    let mut r = docs_row();
    match value {
        Some(v) => {
            r.insert(column.to_string(), v);
        }
        None => {
            r.remove(column);
        }
    }
    assert!(Bookmark::from_row(&r).is_err());
}

#[test]
fn to_row_uses_owner_column_name() {
    let bookmark = Bookmark::from_row(&docs_row()).unwrap();
    let encoded = bookmark.to_row();
    assert_eq!(encoded.get("user_id"), Some(&json!("u1")));
    assert!(encoded.get("owner_id").is_none());
    assert_eq!(Bookmark::from_row(&encoded).unwrap(), bookmark);
}

#[test]
fn serde_renames_owner_column() {
    let bookmark = Bookmark::from_row(&docs_row()).unwrap();
    let value = serde_json::to_value(&bookmark).unwrap();
    assert_eq!(value["user_id"], json!("u1"));
}

#[parameterized(
    empty_title = { "", "https://example.com", "title" },
    blank_title = { "   ", "https://example.com", "title" },
    empty_url = { "Docs", "", "url" },
    blank_url = { "Docs", "\t\n", "url" },
    both_empty_reports_title = { "", "", "title" },
)]
fn new_bookmark_rejects_empty_fields(title: &str, url: &str, field: &str) {
    let err = NewBookmark::new(title, url, &UserId::from("u1")).unwrap_err();
    assert!(matches!(err, Error::FieldEmpty { field: f } if f == field), "{err}");
}

#[test]
fn new_bookmark_row_leaves_server_fields_out() {
    let new = NewBookmark::new("Docs", "https://docs.example.com", &UserId::from("u1")).unwrap();
    let r = new.to_row();
    assert_eq!(r.len(), 3);
    assert_eq!(r.get("title"), Some(&json!("Docs")));
    assert_eq!(r.get("url"), Some(&json!("https://docs.example.com")));
    assert_eq!(r.get("user_id"), Some(&json!("u1")));
}

#[test]
fn decode_rows_keeps_order_and_sets_aside_bad_rows() {
    let mut second = docs_row();
    second.insert("id".into(), json!("b2"));
    let bad = row(json!({ "id": "b3", "title": "no url" }));

    let decoded = decode_rows(vec![docs_row(), bad, second]);
    let ids: Vec<_> = decoded.records.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b1", "b2"]);
    assert_eq!(decoded.rejected.len(), 1);
}

#[parameterized(
    long = { "0f8fad5b-d9cb-469f-a165-70867728950e", "0f8fad5b" },
    short = { "b1", "b1" },
)]
fn short_id_truncates(id: &str, expected: &str) {
    let mut r = docs_row();
    r.insert("id".into(), json!(id));
    assert_eq!(Bookmark::from_row(&r).unwrap().short_id(), expected);
}
