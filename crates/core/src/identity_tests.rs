// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn from_value_reads_id_and_email() {
    let user = json!({
        "id": "u1",
        "email": "a@x.com",
        "aud": "authenticated",
        "user_metadata": { "full_name": "A" }
    });
    let identity = Identity::from_value(&user).unwrap();
    assert_eq!(identity.id.as_str(), "u1");
    assert_eq!(identity.email, "a@x.com");
}

#[test]
fn from_value_accepts_empty_email() {
    let identity = Identity::from_value(&json!({ "id": "u1", "email": "" })).unwrap();
    assert_eq!(identity.email, "");
}

#[parameterized(
    missing_id = { json!({ "email": "a@x.com" }) },
    numeric_id = { json!({ "id": 7, "email": "a@x.com" }) },
    empty_id = { json!({ "id": "", "email": "a@x.com" }) },
    missing_email = { json!({ "id": "u1" }) },
    null_email = { json!({ "id": "u1", "email": null }) },
    numeric_email = { json!({ "id": "u1", "email": 3 }) },
)]
fn from_value_rejects_malformed(value: serde_json::Value) {
    assert!(Identity::from_value(&value).is_err());
}

#[test]
fn user_id_serializes_transparently() {
    let id = UserId::from("u1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
    assert_eq!(id.to_string(), "u1");
}
