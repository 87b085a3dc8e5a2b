// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hookline serve` command implementation.
//!
//! Opens the store, builds the HTTP transport and the shared session, and
//! serves the gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use hookline_config::HooklineConfig;
use hookline_core::{HooklineError, TranscriptStore, WebhookTransport};
use hookline_gateway::GatewayState;
use hookline_session::SharedSession;
use hookline_storage::SqliteStore;
use hookline_webhook::HttpWebhookTransport;
use tracing::info;

use crate::shutdown;

pub async fn run_serve(config: HooklineConfig) -> Result<(), HooklineError> {
    let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
    info!(path = %config.storage.database_path, "transcript store ready");

    let transport: Arc<dyn WebhookTransport> =
        Arc::new(HttpWebhookTransport::new(&config.transport)?);
    let state = GatewayState::new(store.clone() as Arc<dyn TranscriptStore>, transport);
    let session = state.session.clone();

    let cancel = shutdown::install_signal_handler();
    let result = hookline_gateway::start_server(&config.gateway, state, async move {
        cancel.cancelled().await;
    })
    .await;

    // Close even when the server failed, so the WAL gets checkpointed.
    drain_and_close(&session, store.as_ref()).await?;
    info!("hookline serve shutdown complete");
    result
}

/// Lets an in-flight send finish persisting, then closes the store.
///
/// A send whose HTTP client went away keeps running on its own task.
async fn drain_and_close(
    session: &SharedSession,
    store: &dyn TranscriptStore,
) -> Result<(), HooklineError> {
    if session.is_busy() {
        info!("waiting for the in-flight send to finish");
    }
    session.wait_idle().await;
    store.close().await
}
