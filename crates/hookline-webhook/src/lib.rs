// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP webhook transport for Hookline.
//!
//! Implements [`WebhookTransport`] on top of `reqwest`: bearer-authenticated
//! POSTs, JSON or multipart encoding, and reply normalization.

pub mod client;
pub mod normalize;

use async_trait::async_trait;
use hookline_config::model::TransportConfig;
use hookline_core::attachment::RawFile;
use hookline_core::types::{AdapterType, ConversationId, Endpoint, HealthStatus, NormalizedReply};
use hookline_core::{HooklineError, PluginAdapter, WebhookTransport};
use tracing::{debug, info};

use crate::client::WebhookClient;

/// The production transport.
pub struct HttpWebhookTransport {
    client: WebhookClient,
}

impl HttpWebhookTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, HooklineError> {
        let client = WebhookClient::new(config)?;
        info!(
            timeout_secs = config.request_timeout_secs,
            "webhook transport initialized"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for HttpWebhookTransport {
    fn name(&self) -> &str {
        "http-webhook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    /// Endpoints are remote and user-supplied, so there is nothing to check up front.
    async fn health_check(&self) -> Result<HealthStatus, HooklineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl WebhookTransport for HttpWebhookTransport {
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &str,
        conversation_id: Option<ConversationId>,
        files: &[RawFile],
    ) -> Result<NormalizedReply, HooklineError> {
        debug!(
            endpoint_id = endpoint.id,
            conversation_id,
            files = files.len(),
            "sending turn to webhook"
        );
        let shape = self
            .client
            .post(&endpoint.url, &endpoint.credential, message, conversation_id, files)
            .await?;
        Ok(normalize::normalize(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> HttpWebhookTransport {
        HttpWebhookTransport::new(&TransportConfig::default()).unwrap()
    }

    fn endpoint(server: &MockServer) -> Endpoint {
        Endpoint {
            id: 1,
            name: "demo".into(),
            url: format!("{}/hook", server.uri()),
            credential: "tok".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn text_turn_is_sent_as_json_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("authorization", "Bearer tok"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"message": "Hello", "UUID": 12})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"message": "Hi there"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let reply = transport()
            .send(&endpoint(&server), "Hello", Some(12), &[])
            .await
            .unwrap();
        assert_eq!(reply.content, "Hi there");
        assert!(reply.attachments.is_none());
    }

    #[tokio::test]
    async fn files_switch_to_multipart_with_one_part_each() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("authorization", "Bearer tok"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": "got it"})))
            .mount(&server)
            .await;

        let files = vec![
            RawFile::new("a.png", "image/png", b"AAAA".to_vec()),
            RawFile::new("b.jpg", "image/jpeg", b"BBBB".to_vec()),
        ];
        let reply = transport()
            .send(&endpoint(&server), "look", None, &files)
            .await
            .unwrap();
        assert_eq!(reply.content, "got it");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let content_type = requests[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&requests[0].body);
        assert_eq!(body.matches("name=\"data\"").count(), 2);
        assert!(body.contains("name=\"message\""));
        assert!(body.contains("name=\"UUID\""));
        assert!(body.contains("AAAA"));
        assert!(body.contains("filename=\"b.jpg\""));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = transport()
            .send(&endpoint(&server), "Hello", None, &[])
            .await
            .unwrap_err();
        match err {
            HooklineError::Transport { status, message, .. } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let err = transport()
            .send(&endpoint(&server), "Hello", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HooklineError::Transport { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let ep = Endpoint {
            id: 1,
            name: "gone".into(),
            url: "http://127.0.0.1:1/hook".into(),
            credential: "tok".into(),
            created_at: Utc::now(),
        };

        let err = transport().send(&ep, "Hello", None, &[]).await.unwrap_err();
        assert!(matches!(err, HooklineError::Transport { .. }));
    }

    #[tokio::test]
    async fn configured_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = TransportConfig {
            request_timeout_secs: 1,
            ..TransportConfig::default()
        };
        let transport = HttpWebhookTransport::new(&config).unwrap();
        let err = transport
            .send(&endpoint(&server), "Hello", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HooklineError::Transport { .. }));
    }

    #[tokio::test]
    async fn reply_attachment_lands_under_data0() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "ok",
                "data": {"mimeType": "image/png", "data": "aGk=", "fileName": "x.png"}
            })))
            .mount(&server)
            .await;

        let reply = transport()
            .send(&endpoint(&server), "Hello", None, &[])
            .await
            .unwrap();
        assert_eq!(reply.content, "ok");
        let set = reply.attachments.unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("data0").is_some());
    }

    #[test]
    fn adapter_identity() {
        let t = transport();
        assert_eq!(t.name(), "http-webhook");
        assert_eq!(t.adapter_type(), AdapterType::Transport);
    }
}
