// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation session: active endpoint, active conversation, and the
//! visible transcript.
//!
//! A send moves the session `Idle -> Sending -> Idle`. A failed exchange
//! leaves an `Error: ` entry in the transcript and the session usable for
//! the next send. Operations take `&mut self`, so a single owner cannot
//! overlap them; see [`crate::SharedSession`] for shared access.
//!
//! Every change to the state or the transcript is published as a
//! [`SessionSnapshot`] on a watch channel, including the intermediate
//! `Sending` view with the pending user entry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hookline_core::attachment::{self, AttachmentSet, RawFile};
use hookline_core::types::{
    Author, Conversation, ConversationId, Endpoint, EndpointId, EndpointSummary, NewMessage,
};
use hookline_core::{HooklineError, TranscriptStore, WebhookTransport};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::transcript::TranscriptEntry;

/// Characters kept when a conversation is named after its first message.
pub const TITLE_PREVIEW_CHARS: usize = 20;

/// Where a session is in its send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Sending,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SessionState::Idle => "idle",
            SessionState::Sending => "sending",
        })
    }
}

/// Result of one send.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    /// The endpoint's reply, or the `Error: ` entry when the exchange failed.
    pub entry: TranscriptEntry,
    /// The conversation after its first-message rename, if this send did one.
    pub renamed: Option<Conversation>,
    /// Failure description when the exchange failed.
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Read-only view of a session, as handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub endpoint: Option<EndpointSummary>,
    pub conversation_id: Option<ConversationId>,
    pub state: SessionState,
    pub last_error: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
}

/// Conversation name derived from the first user message.
pub fn title_preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Orchestrates one user's chat with one endpoint at a time.
pub struct ConversationSession {
    store: Arc<dyn TranscriptStore>,
    transport: Arc<dyn WebhookTransport>,
    endpoint: Option<Endpoint>,
    conversation_id: Option<ConversationId>,
    transcript: Vec<TranscriptEntry>,
    state: SessionState,
    last_error: Option<String>,
    updates: watch::Sender<SessionSnapshot>,
}

impl ConversationSession {
    /// A session in the "nothing selected" state.
    pub fn new(store: Arc<dyn TranscriptStore>, transport: Arc<dyn WebhookTransport>) -> Self {
        let mut session = Self {
            store,
            transport,
            endpoint: None,
            conversation_id: None,
            transcript: Vec::new(),
            state: SessionState::Idle,
            last_error: None,
            updates: watch::channel(SessionSnapshot {
                endpoint: None,
                conversation_id: None,
                state: SessionState::Idle,
                last_error: None,
                transcript: Vec::new(),
            })
            .0,
        };
        session.reset();
        session.publish();
        session
    }

    /// Follows the session's snapshot as it changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    pub fn active_endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.conversation_id
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Sending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            endpoint: self.endpoint.as_ref().map(Endpoint::summary),
            conversation_id: self.conversation_id,
            state: self.state,
            last_error: self.last_error.clone(),
            transcript: self.transcript.clone(),
        }
    }

    /// Back to the placeholder view: no endpoint, no conversation, greeting only.
    fn reset(&mut self) {
        self.endpoint = None;
        self.conversation_id = None;
        self.transcript = vec![TranscriptEntry::greeting()];
        self.state = SessionState::Idle;
    }

    /// Records a failed load. `NotFound` also drops back to the placeholder view.
    fn fail_load(&mut self, err: HooklineError) -> HooklineError {
        if err.is_not_found() {
            warn!(error = %err, "selection no longer exists, resetting session");
            self.reset();
        } else {
            warn!(error = %err, "failed to load selection");
        }
        self.last_error = Some(err.to_string());
        self.publish();
        err
    }

    /// Select an endpoint, or clear the selection with `None`.
    ///
    /// Selecting an endpoint empties the transcript and forgets the active
    /// conversation; the caller creates or opens one next.
    pub async fn activate(&mut self, endpoint_id: Option<EndpointId>) -> Result<(), HooklineError> {
        self.last_error = None;
        let Some(id) = endpoint_id else {
            self.reset();
            self.publish();
            debug!("session reset to placeholder");
            return Ok(());
        };

        match self.store.get_endpoint(id).await {
            Ok(endpoint) => {
                info!(endpoint_id = id, name = %endpoint.name, "endpoint activated");
                self.endpoint = Some(endpoint);
                self.conversation_id = None;
                self.transcript.clear();
                self.publish();
                Ok(())
            }
            Err(e) => Err(self.fail_load(e)),
        }
    }

    /// Load a stored conversation and its endpoint, replacing the transcript.
    pub async fn open(&mut self, conversation_id: ConversationId) -> Result<(), HooklineError> {
        self.last_error = None;
        match self.load(conversation_id).await {
            Ok((endpoint, entries)) => {
                info!(
                    conversation_id,
                    endpoint_id = endpoint.id,
                    messages = entries.len(),
                    "conversation opened"
                );
                self.endpoint = Some(endpoint);
                self.conversation_id = Some(conversation_id);
                self.transcript = entries;
                self.publish();
                Ok(())
            }
            Err(e) => Err(self.fail_load(e)),
        }
    }

    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<(Endpoint, Vec<TranscriptEntry>), HooklineError> {
        let conversation = self.store.get_conversation(conversation_id).await?;
        let endpoint = self.store.get_endpoint(conversation.endpoint_id).await?;
        let messages = self.store.list_messages(conversation_id).await?;
        Ok((endpoint, messages.into_iter().map(TranscriptEntry::from).collect()))
    }

    /// Select an endpoint and start a fresh conversation with it.
    pub async fn start_conversation(
        &mut self,
        endpoint_id: EndpointId,
    ) -> Result<Conversation, HooklineError> {
        self.activate(Some(endpoint_id)).await?;
        match self.store.create_conversation(endpoint_id).await {
            Ok(conversation) => {
                info!(
                    conversation_id = conversation.id,
                    endpoint_id, "conversation started"
                );
                self.conversation_id = Some(conversation.id);
                self.publish();
                Ok(conversation)
            }
            Err(e) => Err(self.fail_load(e)),
        }
    }

    /// Point the session at a conversation without reloading the transcript.
    pub fn set_active_conversation(&mut self, conversation_id: Option<ConversationId>) {
        self.conversation_id = conversation_id;
        self.publish();
    }

    /// Empty the visible transcript. Stored messages are untouched.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.last_error = None;
        self.publish();
    }

    /// Send one user turn to the active endpoint.
    ///
    /// Only `NoActiveEndpoint` is returned as an error. Every later failure
    /// ends up as an `Error: ` transcript entry and in [`SendOutcome::error`],
    /// with whatever was already shown or stored left in place.
    pub async fn send(
        &mut self,
        text: &str,
        files: &[RawFile],
    ) -> Result<SendOutcome, HooklineError> {
        let Some(endpoint) = self.endpoint.clone() else {
            let err = HooklineError::NoActiveEndpoint;
            self.last_error = Some(err.to_string());
            self.publish();
            return Err(err);
        };

        self.state = SessionState::Sending;
        self.last_error = None;

        let attachments = attachment::encode_all(files);
        let accepted = attachment::eligible(files);

        let user_entry = TranscriptEntry::user(text, attachments.clone());
        let timestamp = user_entry.timestamp;
        self.transcript.push(user_entry);
        let user_index = self.transcript.len() - 1;
        self.publish();

        let mut renamed = None;
        let result = self
            .exchange(
                &endpoint,
                text,
                attachments,
                timestamp,
                &accepted,
                user_index,
                &mut renamed,
            )
            .await;
        self.state = SessionState::Idle;

        match result {
            Ok(entry) => {
                self.publish();
                Ok(SendOutcome {
                    entry,
                    renamed,
                    error: None,
                })
            }
            Err(err) => {
                warn!(
                    endpoint_id = endpoint.id,
                    conversation_id = self.conversation_id,
                    error = %err,
                    "send failed"
                );
                let entry = TranscriptEntry::error(&err);
                self.transcript.push(entry.clone());
                self.last_error = Some(err.to_string());
                self.publish();
                Ok(SendOutcome {
                    entry,
                    renamed,
                    error: Some(err.to_string()),
                })
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn exchange(
        &mut self,
        endpoint: &Endpoint,
        text: &str,
        attachments: Option<AttachmentSet>,
        timestamp: DateTime<Utc>,
        files: &[RawFile],
        user_index: usize,
        renamed: &mut Option<Conversation>,
    ) -> Result<TranscriptEntry, HooklineError> {
        let conversation_id = self.conversation_id;

        if let Some(id) = conversation_id {
            let first = self.store.has_no_messages(id).await?;

            let stored = self
                .store
                .append_message(NewMessage {
                    conversation_id: id,
                    content: text.to_string(),
                    author: Author::User,
                    timestamp,
                    attachments,
                })
                .await?;
            if let Some(entry) = self.transcript.get_mut(user_index) {
                entry.id = Some(stored.id);
            }

            if first {
                let conversation = self.store.rename_conversation(id, &title_preview(text)).await?;
                debug!(conversation_id = id, name = %conversation.name, "conversation renamed");
                *renamed = Some(conversation);
            }
        }

        let reply = self
            .transport
            .send(endpoint, text, conversation_id, files)
            .await?;

        let mut entry = TranscriptEntry::reply(reply.content, reply.attachments);
        self.transcript.push(entry.clone());
        let reply_index = self.transcript.len() - 1;

        if let Some(id) = conversation_id {
            let stored = self
                .store
                .append_message(NewMessage {
                    conversation_id: id,
                    content: entry.content.clone(),
                    author: Author::Endpoint,
                    timestamp: entry.timestamp,
                    attachments: entry.attachments.clone(),
                })
                .await?;
            entry.id = Some(stored.id);
            if let Some(shown) = self.transcript.get_mut(reply_index) {
                shown.id = Some(stored.id);
            }
        }

        Ok(entry)
    }
}
