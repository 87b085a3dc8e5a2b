// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply normalization.
//!
//! Endpoints answer with an object or a one-element array holding that
//! object. The display text comes from `message`, then `response`, then a
//! JSON dump of the whole object. An optional `data` field carries
//! attachments: a map already keyed `data0, data1, ...` is kept as-is, any
//! other value is stored under `data0`.

use hookline_core::attachment::{AttachmentSet, AttachmentValue};
use hookline_core::types::NormalizedReply;
use serde::Deserialize;
use serde_json::{Map, Value};

/// The two reply shapes endpoints are known to send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReplyShape {
    Wrapped(Vec<Value>),
    Single(Value),
}

impl ReplyShape {
    /// The reply object itself, with the array wrapper removed.
    pub fn into_payload(self) -> Value {
        match self {
            ReplyShape::Wrapped(mut items) if !items.is_empty() => items.swap_remove(0),
            ReplyShape::Wrapped(items) => Value::Array(items),
            ReplyShape::Single(value) => value,
        }
    }
}

/// Normalize a parsed reply body.
pub fn normalize(shape: ReplyShape) -> NormalizedReply {
    let payload = shape.into_payload();
    let Value::Object(fields) = &payload else {
        return NormalizedReply {
            content: payload.to_string(),
            attachments: None,
        };
    };

    let content = text_field(fields, "message")
        .or_else(|| text_field(fields, "response"))
        .unwrap_or_else(|| payload.to_string());

    let attachments = fields
        .get("data")
        .filter(|v| is_truthy(v))
        .cloned()
        .and_then(attachments_from);

    NormalizedReply {
        content,
        attachments,
    }
}

/// A present, truthy field rendered as text. Strings are used verbatim.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        v if is_truthy(v) && !v.is_string() => Some(v.to_string()),
        _ => None,
    }
}

/// Loose truthiness: null, false, zero, and the empty string count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn attachments_from(data: Value) -> Option<AttachmentSet> {
    let mut set = AttachmentSet::new();
    match data {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| AttachmentSet::is_key(k)) => {
            for (key, value) in map {
                set.insert(key, to_attachment_value(value));
            }
        }
        other => {
            set.insert(AttachmentSet::key(0), to_attachment_value(other));
        }
    }
    set.into_non_empty()
}

fn to_attachment_value(value: Value) -> AttachmentValue {
    serde_json::from_value(value.clone()).unwrap_or(AttachmentValue::Opaque(value))
}
