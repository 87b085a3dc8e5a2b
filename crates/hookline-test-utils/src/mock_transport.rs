// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock webhook transport for deterministic testing.
//!
//! `MockTransport` implements `WebhookTransport` with scripted outcomes and
//! records every request it receives, so session tests run without a
//! network.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hookline_core::HooklineError;
use hookline_core::attachment::{AttachmentSet, RawFile};
use hookline_core::traits::adapter::PluginAdapter;
use hookline_core::traits::transport::WebhookTransport;
use hookline_core::types::{
    AdapterType, ConversationId, Endpoint, EndpointId, HealthStatus, NormalizedReply,
};

/// Content returned when the script is empty.
pub const DEFAULT_REPLY: &str = "mock reply";

enum Scripted {
    Reply(NormalizedReply),
    Failure { message: String, status: Option<u16> },
}

/// One call to [`MockTransport::send`], as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint_id: EndpointId,
    pub url: String,
    pub credential: String,
    pub message: String,
    pub conversation_id: Option<ConversationId>,
    pub files: Vec<RawFile>,
}

/// A mock transport that returns scripted outcomes in FIFO order.
///
/// When the script runs out, every send gets a plain [`DEFAULT_REPLY`].
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Create a mock transport pre-loaded with plain text replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        let script = replies
            .into_iter()
            .map(|content| {
                Scripted::Reply(NormalizedReply {
                    content,
                    attachments: None,
                })
            })
            .collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            ..Self::new()
        }
    }

    /// Hold every send for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, content: impl Into<String>) {
        self.push_reply_with(content, None).await;
    }

    pub async fn push_reply_with(
        &self,
        content: impl Into<String>,
        attachments: Option<AttachmentSet>,
    ) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Reply(NormalizedReply {
                content: content.into(),
                attachments,
            }));
    }

    /// Queue a transport failure, as if the endpoint answered `status`.
    pub async fn push_failure(&self, message: impl Into<String>, status: Option<u16>) {
        self.script.lock().await.push_back(Scripted::Failure {
            message: message.into(),
            status,
        });
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, HooklineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl WebhookTransport for MockTransport {
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &str,
        conversation_id: Option<ConversationId>,
        files: &[RawFile],
    ) -> Result<NormalizedReply, HooklineError> {
        self.requests.lock().await.push(RecordedRequest {
            endpoint_id: endpoint.id,
            url: endpoint.url.clone(),
            credential: endpoint.credential.clone(),
            message: message.to_string(),
            conversation_id,
            files: files.to_vec(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Failure { message, status }) => {
                Err(HooklineError::transport(message, status))
            }
            None => Ok(NormalizedReply {
                content: DEFAULT_REPLY.to_string(),
                attachments: None,
            }),
        }
    }
}
