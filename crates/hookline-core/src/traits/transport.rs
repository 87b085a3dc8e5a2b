// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook transport trait.

use async_trait::async_trait;

use crate::attachment::RawFile;
use crate::error::HooklineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationId, Endpoint, NormalizedReply};

/// Delivers one user turn to a remote endpoint and returns its reply.
#[async_trait]
pub trait WebhookTransport: PluginAdapter {
    /// Sends `message` (plus any raw files) to `endpoint`.
    ///
    /// The conversation id, when present, is passed along so the remote side
    /// can keep its own context. Any non-2xx status, network failure, or
    /// non-JSON body is reported as [`HooklineError::Transport`].
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &str,
        conversation_id: Option<ConversationId>,
        files: &[RawFile],
    ) -> Result<NormalizedReply, HooklineError>;
}
