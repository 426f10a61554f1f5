// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Change-feed wire frames.
//!
//! The feed speaks Phoenix channel framing over a WebSocket:
//! every frame is `{topic, event, payload, ref}`.
//!
//! - Client joins `realtime:<channel>` with a `postgres_changes` config,
//!   sends a `heartbeat` on the `phoenix` topic periodically and leaves with
//!   `phx_leave`.
//! - Server answers joins and heartbeats with `phx_reply` and pushes
//!   `postgres_changes` frames carrying the affected rows.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bookmark::Row;
use crate::change::{ChangeEvent, ChangeKind, ChannelSpec};
use crate::error::{Error, Result};

/// Topic used for connection-level heartbeats.
pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// A single frame in either direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    /// Topic name for a channel.
    pub fn topic_for(channel: &str) -> String {
        format!("realtime:{channel}")
    }

    /// Join request subscribing to row changes described by `spec`.
    pub fn join(spec: &ChannelSpec, access_token: Option<&str>, reference: u64) -> Self {
        let mut change = json!({
            "event": spec.event_selector(),
            "schema": spec.schema,
            "table": spec.table,
        });
        if let Some(filter) = &spec.filter {
            change["filter"] = Value::String(filter.to_string());
        }

        let mut payload = json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [change],
                "private": false,
            }
        });
        if let Some(token) = access_token {
            payload["access_token"] = Value::String(token.to_string());
        }

        Frame {
            topic: Frame::topic_for(&spec.name),
            event: "phx_join".to_string(),
            payload,
            reference: Some(reference.to_string()),
        }
    }

    /// Leave request for a joined channel.
    pub fn leave(channel: &str, reference: u64) -> Self {
        Frame {
            topic: Frame::topic_for(channel),
            event: "phx_leave".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    /// Connection keepalive.
    pub fn heartbeat(reference: u64) -> Self {
        Frame {
            topic: HEARTBEAT_TOPIC.to_string(),
            event: "heartbeat".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a frame from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A row changed.
    Change(ChangeEvent),
    /// Reply to a request identified by `reference`.
    Reply {
        reference: Option<String>,
        ok: bool,
        message: Option<String>,
    },
    /// Channel-level status notice (`system` event).
    System { ok: bool, message: Option<String> },
    /// Server closed or errored the channel.
    Closed { reason: Option<String> },
    /// Any other event; ignored by the client.
    Other(String),
}

impl Inbound {
    /// Interprets a frame received from the server.
    pub fn from_frame(frame: Frame) -> Result<Self> {
        match frame.event.as_str() {
            "postgres_changes" => decode_change(&frame.payload).map(Inbound::Change),
            "phx_reply" => Ok(Inbound::Reply {
                reference: frame.reference,
                ok: status_ok(&frame.payload),
                message: reply_message(&frame.payload),
            }),
            "system" => Ok(Inbound::System {
                ok: status_ok(&frame.payload),
                message: frame
                    .payload
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            "phx_close" => Ok(Inbound::Closed { reason: None }),
            "phx_error" => Ok(Inbound::Closed {
                reason: reply_message(&frame.payload).or_else(|| Some("channel error".into())),
            }),
            other => Ok(Inbound::Other(other.to_string())),
        }
    }
}

fn status_ok(payload: &Value) -> bool {
    payload.get("status").and_then(Value::as_str) == Some("ok")
}

fn reply_message(payload: &Value) -> Option<String> {
    let response = payload.get("response")?;
    response
        .get("reason")
        .or_else(|| response.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn decode_change(payload: &Value) -> Result<ChangeEvent> {
    let data = payload
        .get("data")
        .ok_or_else(|| Error::UnexpectedFrame("postgres_changes without data".into()))?;

    let kind: ChangeKind = data
        .get("type")
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| Error::UnexpectedFrame("postgres_changes without type".into()))?;

    let table = data
        .get("table")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::UnexpectedFrame("postgres_changes without table".into()))?
        .to_string();

    Ok(ChangeEvent {
        kind,
        table,
        record: non_empty_row(data.get("record")),
        old_record: non_empty_row(data.get("old_record")),
    })
}

fn non_empty_row(value: Option<&Value>) -> Option<Row> {
    match value {
        Some(Value::Object(map)) if !map.is_empty() => Some(map.clone()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
