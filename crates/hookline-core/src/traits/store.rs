// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript store trait: durable endpoints, conversations, and messages.

use async_trait::async_trait;

use crate::error::HooklineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Conversation, ConversationId, Endpoint, EndpointId, EndpointSummary, Message, MessageId,
    NewEndpoint, NewMessage,
};

/// Durable storage for everything a session reads or writes.
///
/// Conversations are listed newest first. Messages are listed oldest first.
/// Deleting an endpoint removes its conversations, and deleting a
/// conversation removes its messages.
#[async_trait]
pub trait TranscriptStore: PluginAdapter {
    /// Prepares the backend (schema migrations and the like).
    async fn initialize(&self) -> Result<(), HooklineError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), HooklineError>;

    async fn create_endpoint(&self, endpoint: NewEndpoint) -> Result<Endpoint, HooklineError>;

    /// All endpoints, oldest first, without credentials.
    async fn list_endpoints(&self) -> Result<Vec<EndpointSummary>, HooklineError>;

    async fn get_endpoint(&self, id: EndpointId) -> Result<Endpoint, HooklineError>;

    /// Removes an endpoint and every conversation bound to it.
    async fn delete_endpoint(&self, id: EndpointId) -> Result<(), HooklineError>;

    /// Creates a conversation named after the endpoint, snapshotting its name.
    async fn create_conversation(
        &self,
        endpoint_id: EndpointId,
    ) -> Result<Conversation, HooklineError>;

    async fn get_conversation(&self, id: ConversationId) -> Result<Conversation, HooklineError>;

    /// All conversations, most recently created first.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, HooklineError>;

    async fn delete_conversation(&self, id: ConversationId) -> Result<(), HooklineError>;

    async fn rename_conversation(
        &self,
        id: ConversationId,
        name: &str,
    ) -> Result<Conversation, HooklineError>;

    async fn append_message(&self, message: NewMessage) -> Result<Message, HooklineError>;

    /// Messages of one conversation, oldest first. `NotFound` if the
    /// conversation does not exist.
    async fn list_messages(&self, id: ConversationId) -> Result<Vec<Message>, HooklineError>;

    /// One message by id, whatever conversation it belongs to.
    async fn get_message(&self, id: MessageId) -> Result<Message, HooklineError>;

    /// True when the conversation exists and holds no messages yet.
    async fn has_no_messages(&self, id: ConversationId) -> Result<bool, HooklineError> {
        Ok(self.list_messages(id).await?.is_empty())
    }
}
