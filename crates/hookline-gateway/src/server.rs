// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use hookline_config::model::GatewayConfig;
use hookline_core::{HooklineError, TranscriptStore, WebhookTransport};
use hookline_session::{ConversationSession, SharedSession};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Largest request body accepted by the send route.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<dyn TranscriptStore>,
    pub transport: Arc<dyn WebhookTransport>,
    /// The one session driven through `/api/session`.
    pub session: SharedSession,
}

impl GatewayState {
    pub fn new(store: Arc<dyn TranscriptStore>, transport: Arc<dyn WebhookTransport>) -> Self {
        let session = SharedSession::new(ConversationSession::new(
            Arc::clone(&store),
            Arc::clone(&transport),
        ));
        Self {
            store,
            transport,
            session,
        }
    }
}

/// All gateway routes over `state`.
pub fn router(state: GatewayState) -> Router {
    let api = Router::new()
        .route(
            "/api/endpoints",
            get(handlers::list_endpoints).post(handlers::create_endpoint),
        )
        .route(
            "/api/endpoints/{id}",
            get(handlers::get_endpoint).delete(handlers::delete_endpoint),
        )
        .route(
            "/api/conversations",
            get(handlers::list_conversations).post(handlers::create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(handlers::get_conversation)
                .patch(handlers::rename_conversation)
                .delete(handlers::delete_conversation),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(handlers::list_messages),
        )
        .route("/api/messages", post(handlers::append_message))
        .route(
            "/api/messages/{id}/attachments/{key}",
            get(handlers::get_attachment),
        )
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/activate", post(handlers::activate_session))
        .route("/api/session/start", post(handlers::start_conversation))
        .route("/api/session/open", post(handlers::open_conversation))
        .route(
            "/api/session/send",
            post(handlers::send_message).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/session/clear", post(handlers::clear_session));

    Router::new()
        .route("/health", get(handlers::get_health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds to the configured host and port and serves until `shutdown` resolves.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), HooklineError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HooklineError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| HooklineError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
