// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entries of the visible transcript.

use chrono::{DateTime, Utc};
use hookline_core::attachment::AttachmentSet;
use hookline_core::types::{Author, Message, MessageId};
use serde::Serialize;

/// Shown when nothing is selected.
pub const GREETING: &str = "Hello! Pick an endpoint or a conversation from the history.";

/// Prefix of synthetic entries describing a failed send.
pub const ERROR_PREFIX: &str = "Error: ";

/// One line of the visible transcript.
///
/// Entries mirror stored messages once persisted (`id` is set). The
/// greeting, error entries, and turns sent outside a conversation never
/// get an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub id: Option<MessageId>,
    pub content: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<AttachmentSet>,
    /// True for synthetic entries (greeting, errors) that are never stored.
    pub synthetic: bool,
}

impl TranscriptEntry {
    pub fn user(content: &str, attachments: Option<AttachmentSet>) -> Self {
        Self {
            id: None,
            content: content.to_string(),
            author: Author::User,
            timestamp: Utc::now(),
            attachments,
            synthetic: false,
        }
    }

    pub fn reply(content: String, attachments: Option<AttachmentSet>) -> Self {
        Self {
            id: None,
            content,
            author: Author::Endpoint,
            timestamp: Utc::now(),
            attachments,
            synthetic: false,
        }
    }

    pub fn greeting() -> Self {
        Self {
            synthetic: true,
            ..Self::reply(GREETING.to_string(), None)
        }
    }

    pub fn error(err: &dyn std::fmt::Display) -> Self {
        Self {
            synthetic: true,
            ..Self::reply(format!("{ERROR_PREFIX}{err}"), None)
        }
    }

    pub fn is_error(&self) -> bool {
        self.synthetic && self.content.starts_with(ERROR_PREFIX)
    }
}

impl From<Message> for TranscriptEntry {
    fn from(message: Message) -> Self {
        Self {
            id: Some(message.id),
            content: message.content,
            author: message.author,
            timestamp: message.timestamp,
            attachments: message.attachments,
            synthetic: false,
        }
    }
}
