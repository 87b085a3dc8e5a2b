// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the transport, and the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::attachment::AttachmentSet;
use crate::error::HooklineError;

/// Store-assigned identifier of an endpoint.
pub type EndpointId = i64;

/// Store-assigned identifier of a conversation.
pub type ConversationId = i64;

/// Store-assigned identifier of a message.
pub type MessageId = i64;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Transport,
}

/// A registered webhook target.
///
/// `Debug` output redacts the credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    /// Sent verbatim as `Authorization: Bearer <credential>`.
    pub credential: String,
    pub created_at: DateTime<Utc>,
}

impl Endpoint {
    /// The endpoint as it appears in listings, without its credential.
    pub fn summary(&self) -> EndpointSummary {
        EndpointSummary {
            id: self.id,
            name: self.name.clone(),
            url: self.url.clone(),
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("credential", &"[redacted]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Listing view of an endpoint. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSummary {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new endpoint.
#[derive(Clone, Deserialize)]
pub struct NewEndpoint {
    pub name: String,
    pub url: String,
    pub credential: String,
}

impl NewEndpoint {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            credential: credential.into(),
        }
    }

    /// Checks the fields a store requires before inserting.
    ///
    /// Name uniqueness is the store's job; everything else is checked here.
    pub fn validate(&self) -> Result<(), HooklineError> {
        if self.name.trim().is_empty() {
            return Err(HooklineError::Validation(
                "endpoint name must not be empty".to_string(),
            ));
        }
        if self.credential.is_empty() {
            return Err(HooklineError::Validation(
                "endpoint credential must not be empty".to_string(),
            ));
        }
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| HooklineError::Validation(format!("invalid URL `{}`: {e}", self.url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HooklineError::Validation(format!(
                "URL scheme `{}` not supported, use http or https",
                parsed.scheme()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for NewEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewEndpoint")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("credential", &"[redacted]")
            .finish()
    }
}

/// A persisted chat session bound to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub endpoint_id: EndpointId,
    /// Endpoint name captured when the conversation was created. Never refreshed.
    pub endpoint_name: String,
    /// Display name. Starts as the endpoint name, replaced by a preview
    /// of the first user message.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Author {
    User,
    Endpoint,
}

impl Author {
    pub fn is_user(self) -> bool {
        matches!(self, Author::User)
    }

    pub fn from_is_user(is_user: bool) -> Self {
        if is_user { Author::User } else { Author::Endpoint }
    }
}

/// One stored turn of a conversation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub content: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<AttachmentSet>,
}

/// Input for appending a message to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub content: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Option<AttachmentSet>,
}

/// A webhook reply after shape normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReply {
    /// Display text extracted from `message`, then `response`, then a JSON dump.
    pub content: String,
    /// Attachment data from the reply's `data` field, keyed `data<N>`.
    pub attachments: Option<AttachmentSet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_endpoint_passes() {
        let ep = NewEndpoint::new("demo", "https://example.test/hook", "tok");
        assert!(ep.validate().is_ok());
    }

    #[test]
    fn relative_url_is_rejected() {
        let ep = NewEndpoint::new("demo", "/hook", "tok");
        let err = ep.validate().unwrap_err();
        assert!(matches!(err, HooklineError::Validation(m) if m.contains("invalid URL")));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let ep = NewEndpoint::new("demo", "ftp://example.test/hook", "tok");
        assert!(matches!(ep.validate(), Err(HooklineError::Validation(_))));
    }

    #[test]
    fn blank_name_and_credential_are_rejected() {
        assert!(NewEndpoint::new("  ", "https://a.test", "tok").validate().is_err());
        assert!(NewEndpoint::new("demo", "https://a.test", "").validate().is_err());
    }

    #[test]
    fn debug_output_redacts_credential() {
        let ep = Endpoint {
            id: 1,
            name: "demo".into(),
            url: "https://example.test/hook".into(),
            credential: "super-secret".into(),
            created_at: Utc::now(),
        };
        let dbg = format!("{ep:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("[redacted]"));
        assert_eq!(ep.summary().name, "demo");
    }

    #[test]
    fn author_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Author::User).unwrap(), "\"user\"");
        assert_eq!(Author::from_is_user(false), Author::Endpoint);
        assert!(Author::User.is_user());
    }
}
