// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Hookline.

use strum::Display;
use thiserror::Error;

/// The kind of record a [`HooklineError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Endpoint,
    Conversation,
    Message,
}

/// The primary error type used across the store, transport, and session.
#[derive(Debug, Error)]
pub enum HooklineError {
    /// Bad endpoint input: invalid URL, missing field, duplicate name.
    #[error("validation error: {0}")]
    Validation(String),

    /// An endpoint or conversation id did not resolve.
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    /// A message exists but carries no attachment under this key.
    #[error("message {message_id} has no attachment {key}")]
    AttachmentNotFound { message_id: i64, key: String },

    /// Non-2xx reply, network failure, or a reply body that is not JSON.
    #[error("webhook request failed: {message}")]
    Transport {
        message: String,
        /// HTTP status, when the remote answered at all.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An attachment payload is not valid base64.
    #[error("malformed attachment payload: {0}")]
    MalformedPayload(String),

    /// `send` was called with no endpoint selected.
    #[error("no active endpoint selected")]
    NoActiveEndpoint,

    /// A send is already in flight on this session.
    #[error("a send is already in flight for this session")]
    SessionBusy,

    /// Storage backend errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HooklineError {
    pub fn endpoint_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: ResourceKind::Endpoint,
            id,
        }
    }

    pub fn conversation_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: ResourceKind::Conversation,
            id,
        }
    }

    pub fn message_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: ResourceKind::Message,
            id,
        }
    }

    /// Builds a transport failure with no underlying source error.
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
            source: None,
        }
    }

    /// Returns true when a record or an attachment key did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::AttachmentNotFound { .. })
    }
}
