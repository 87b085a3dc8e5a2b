// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use hookline_core::HooklineError;
use hookline_core::attachment::{AttachmentSet, RawFile};
use hookline_core::types::{
    Author, Conversation, ConversationId, EndpointId, EndpointSummary, HealthStatus, Message,
    MessageId, NewEndpoint, NewMessage,
};
use hookline_session::{SendOutcome, SessionSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

/// Body of a `201 Created` response.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub transport: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub endpoint_id: EndpointId,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Request body for POST /api/messages.
#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub conversation_id: ConversationId,
    pub content: String,
    pub is_user: bool,
    /// Defaults to the time of the request.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Option<AttachmentSet>,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    #[serde(default)]
    pub endpoint_id: Option<EndpointId>,
}

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub conversation_id: ConversationId,
}

fn health_label(status: &Result<HealthStatus, HooklineError>) -> (bool, String) {
    match status {
        Ok(HealthStatus::Healthy) => (true, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (true, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => (false, format!("unhealthy: {reason}")),
        Err(e) => (false, format!("unhealthy: {e}")),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    let (store_ok, store) = health_label(&state.store.health_check().await);
    let (transport_ok, transport) = health_label(&state.transport.health_check().await);
    let ok = store_ok && transport_ok;
    let code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(HealthResponse {
            status: if ok { "ok" } else { "unavailable" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
            transport,
        }),
    )
}

pub async fn list_endpoints(
    State(state): State<GatewayState>,
) -> ApiResult<Json<Vec<EndpointSummary>>> {
    Ok(Json(state.store.list_endpoints().await?))
}

/// POST /api/endpoints
pub async fn create_endpoint(
    State(state): State<GatewayState>,
    Json(body): Json<NewEndpoint>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let endpoint = state.store.create_endpoint(body).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: endpoint.id })))
}

/// GET /api/endpoints/{id}
///
/// The credential stays server-side; clients get the listing view.
pub async fn get_endpoint(
    State(state): State<GatewayState>,
    Path(id): Path<EndpointId>,
) -> ApiResult<Json<EndpointSummary>> {
    Ok(Json(state.store.get_endpoint(id).await?.summary()))
}

pub async fn delete_endpoint(
    State(state): State<GatewayState>,
    Path(id): Path<EndpointId>,
) -> ApiResult<StatusCode> {
    state.store.delete_endpoint(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_conversations(
    State(state): State<GatewayState>,
) -> ApiResult<Json<Vec<Conversation>>> {
    Ok(Json(state.store.list_conversations().await?))
}

pub async fn create_conversation(
    State(state): State<GatewayState>,
    Json(body): Json<CreateConversationRequest>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let conversation = state.store.create_conversation(body.endpoint_id).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<ConversationId>,
) -> ApiResult<Json<Conversation>> {
    Ok(Json(state.store.get_conversation(id).await?))
}

/// PATCH /api/conversations/{id}
pub async fn rename_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<ConversationId>,
    Json(body): Json<RenameRequest>,
) -> ApiResult<Json<Conversation>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(HooklineError::Validation("conversation name must not be empty".into()).into());
    }
    Ok(Json(state.store.rename_conversation(id, name).await?))
}

pub async fn delete_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<ConversationId>,
) -> ApiResult<StatusCode> {
    state.store.delete_conversation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<GatewayState>,
    Path(id): Path<ConversationId>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.store.list_messages(id).await?))
}

/// POST /api/messages
pub async fn append_message(
    State(state): State<GatewayState>,
    Json(body): Json<AppendMessageRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let message = state
        .store
        .append_message(NewMessage {
            conversation_id: body.conversation_id,
            content: body.content,
            author: Author::from_is_user(body.is_user),
            timestamp: body.timestamp.unwrap_or_else(Utc::now),
            attachments: body.attachments.and_then(AttachmentSet::into_non_empty),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: message.id })))
}

/// GET /api/messages/{id}/attachments/{key}
///
/// Serves the decoded bytes of one inline attachment under its own MIME type.
pub async fn get_attachment(
    State(state): State<GatewayState>,
    Path((id, key)): Path<(MessageId, String)>,
) -> ApiResult<Response> {
    let message = state.store.get_message(id).await?;
    let value = message
        .attachments
        .as_ref()
        .and_then(|set| set.get(&key))
        .ok_or_else(|| HooklineError::AttachmentNotFound {
            message_id: id,
            key: key.clone(),
        })?;
    let attachment = value
        .as_inline()
        .ok_or_else(|| HooklineError::MalformedPayload(format!("{key} is not an inline file")))?;
    let bytes = attachment.decode()?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&attachment.mime_type)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    headers.insert(CONTENT_TYPE, content_type);
    if !attachment.file_name.is_empty() {
        let disposition = format!("inline; filename=\"{}\"", attachment.file_name.replace('"', ""));
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(CONTENT_DISPOSITION, value);
        }
    }
    Ok((headers, bytes).into_response())
}

/// GET /api/session
///
/// Never blocks on an in-flight send; shows it as `sending` instead.
pub async fn get_session(State(state): State<GatewayState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// POST /api/session/activate
///
/// `{"endpoint_id": null}` (or `{}`) returns the session to its placeholder.
pub async fn activate_session(
    State(state): State<GatewayState>,
    Json(body): Json<ActivateRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.activate(body.endpoint_id).await?))
}

pub async fn start_conversation(
    State(state): State<GatewayState>,
    Json(body): Json<CreateConversationRequest>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let conversation = state.session.start_conversation(body.endpoint_id).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn open_conversation(
    State(state): State<GatewayState>,
    Json(body): Json<OpenRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.open(body.conversation_id).await?))
}

/// POST /api/session/send
///
/// Multipart form: one `message` text field plus any number of file parts.
/// A failed exchange still answers 200; the outcome carries the error.
pub async fn send_message(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> ApiResult<Json<SendOutcome>> {
    let (text, files) = read_send_form(multipart).await?;
    debug!(files = files.len(), "session send requested");
    Ok(Json(state.session.send(text, files).await?))
}

async fn read_send_form(mut multipart: Multipart) -> Result<(String, Vec<RawFile>), HooklineError> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        HooklineError::Validation(format!("invalid multipart body: {e}"))
    };

    let mut text = None;
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "message" {
            text = Some(field.text().await.map_err(bad_form)?);
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = %name, "ignoring unknown form field");
            continue;
        };
        let content_type = field.content_type().map(str::to_string).unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
        let bytes = field.bytes().await.map_err(bad_form)?;
        files.push(RawFile::new(file_name, content_type, bytes.to_vec()));
    }

    let text = text.unwrap_or_default();
    if text.trim().is_empty() && files.is_empty() {
        return Err(HooklineError::Validation(
            "a message or at least one file is required".into(),
        ));
    }
    Ok((text, files))
}

pub async fn clear_session(State(state): State<GatewayState>) -> ApiResult<StatusCode> {
    state.session.clear()?;
    Ok(StatusCode::NO_CONTENT)
}
