// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`HooklineError`] to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hookline_core::HooklineError;
use serde::Serialize;
use tracing::error;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A handler error, rendered as `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError(pub HooklineError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HooklineError::Validation(_) => StatusCode::BAD_REQUEST,
            HooklineError::NotFound { .. } | HooklineError::AttachmentNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            HooklineError::SessionBusy | HooklineError::NoActiveEndpoint => StatusCode::CONFLICT,
            HooklineError::Transport { .. } => StatusCode::BAD_GATEWAY,
            HooklineError::MalformedPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HooklineError::Storage { .. }
            | HooklineError::Config(_)
            | HooklineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HooklineError> for ApiError {
    fn from(err: HooklineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
