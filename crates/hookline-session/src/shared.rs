// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A session handle that can be cloned across request handlers.
//!
//! At most one operation holds the session at a time. Anything that arrives
//! while a send is in flight fails fast with [`HooklineError::SessionBusy`]
//! instead of queueing behind it. Reads never take the lock: they see the
//! last published snapshot, which shows a send in progress as `sending`.

use std::sync::Arc;

use hookline_core::HooklineError;
use hookline_core::attachment::RawFile;
use hookline_core::types::{Conversation, ConversationId, EndpointId};
use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use tracing::debug;

use crate::session::{ConversationSession, SendOutcome, SessionSnapshot};

#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<ConversationSession>>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SharedSession {
    pub fn new(session: ConversationSession) -> Self {
        let snapshots = session.subscribe();
        Self {
            inner: Arc::new(Mutex::new(session)),
            snapshots,
        }
    }

    fn try_acquire(&self) -> Result<OwnedMutexGuard<ConversationSession>, HooklineError> {
        Arc::clone(&self.inner).try_lock_owned().map_err(|_| {
            debug!("session busy, rejecting operation");
            HooklineError::SessionBusy
        })
    }

    /// True while another operation (normally a send) holds the session.
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// The latest published view of the session. Never blocks.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Waits until no operation holds the session.
    pub async fn wait_idle(&self) {
        let _guard = self.inner.lock().await;
    }

    /// Activates an endpoint and returns the resulting view.
    pub async fn activate(
        &self,
        endpoint_id: Option<EndpointId>,
    ) -> Result<SessionSnapshot, HooklineError> {
        let mut guard = self.try_acquire()?;
        guard.activate(endpoint_id).await?;
        Ok(guard.snapshot())
    }

    /// Opens a stored conversation and returns the resulting view.
    pub async fn open(
        &self,
        conversation_id: ConversationId,
    ) -> Result<SessionSnapshot, HooklineError> {
        let mut guard = self.try_acquire()?;
        guard.open(conversation_id).await?;
        Ok(guard.snapshot())
    }

    pub async fn start_conversation(
        &self,
        endpoint_id: EndpointId,
    ) -> Result<Conversation, HooklineError> {
        self.try_acquire()?.start_conversation(endpoint_id).await
    }

    pub fn set_active_conversation(
        &self,
        conversation_id: Option<ConversationId>,
    ) -> Result<(), HooklineError> {
        self.try_acquire()?.set_active_conversation(conversation_id);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), HooklineError> {
        self.try_acquire()?.clear();
        Ok(())
    }

    /// Sends on a spawned task that owns the session lock.
    ///
    /// The send runs to completion even if the caller stops waiting.
    pub async fn send(
        &self,
        text: String,
        files: Vec<RawFile>,
    ) -> Result<SendOutcome, HooklineError> {
        let mut guard = self.try_acquire()?;
        let handle = tokio::spawn(async move { guard.send(&text, &files).await });
        handle
            .await
            .map_err(|e| HooklineError::Internal(format!("send task failed: {e}")))?
    }
}
