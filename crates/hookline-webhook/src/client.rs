// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for webhook endpoints.
//!
//! One POST per user turn, no retries. Text-only turns go out as JSON,
//! turns with files as `multipart/form-data` with one `data` part per file.

use hookline_config::model::TransportConfig;
use hookline_core::attachment::RawFile;
use hookline_core::types::ConversationId;
use hookline_core::HooklineError;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::debug;

use crate::normalize::ReplyShape;

/// Longest slice of an error body quoted back in a transport error.
const MAX_ERROR_BODY: usize = 512;

/// JSON body for text-only turns.
#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    message: &'a str,
    #[serde(rename = "UUID")]
    uuid: Option<ConversationId>,
}

/// Thin wrapper over a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    pub fn new(config: &TransportConfig) -> Result<Self, HooklineError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| HooklineError::Transport {
            message: format!("failed to build HTTP client: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })?;
        Ok(Self { client })
    }

    /// POST one turn to `url` and parse the reply body.
    pub async fn post(
        &self,
        url: &str,
        credential: &str,
        message: &str,
        conversation_id: Option<ConversationId>,
        files: &[RawFile],
    ) -> Result<ReplyShape, HooklineError> {
        let request = self.client.post(url).bearer_auth(credential);
        let request = if files.is_empty() {
            request.json(&TextRequest {
                message,
                uuid: conversation_id,
            })
        } else {
            request.multipart(multipart_form(message, conversation_id, files))
        };

        let response = request.send().await.map_err(|e| HooklineError::Transport {
            message: format!("HTTP request failed: {e}"),
            status: e.status().map(|s| s.as_u16()),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, parts = files.len(), "webhook response received");

        let body = response.text().await.map_err(|e| HooklineError::Transport {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(HooklineError::transport(
                format!("endpoint returned {status}: {}", truncate(&body)),
                Some(status.as_u16()),
            ));
        }

        serde_json::from_str(&body).map_err(|e| HooklineError::Transport {
            message: format!("reply is not valid JSON: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })
    }
}

fn multipart_form(
    message: &str,
    conversation_id: Option<ConversationId>,
    files: &[RawFile],
) -> Form {
    let uuid = conversation_id.map(|id| id.to_string()).unwrap_or_default();
    files.iter().fold(
        Form::new()
            .text("message", message.to_string())
            .text("UUID", uuid),
        |form, file| form.part("data", file_part(file)),
    )
}

fn file_part(file: &RawFile) -> Part {
    let part = || Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    part()
        .mime_str(&file.content_type)
        .unwrap_or_else(|_| part())
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_serializes_uuid_key() {
        let body = serde_json::to_value(TextRequest {
            message: "Hello",
            uuid: Some(7),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "Hello", "UUID": 7}));

        let body = serde_json::to_value(TextRequest {
            message: "Hello",
            uuid: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "Hello", "UUID": null}));
    }

    #[test]
    fn long_error_bodies_are_cut() {
        let body = "x".repeat(2000);
        assert_eq!(truncate(&body).len(), MAX_ERROR_BODY);
        assert_eq!(truncate("short"), "short");
    }
}
