// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for session and end-to-end tests.
//!
//! `TestHarness` pairs a temp-file SQLite store with a [`MockTransport`] and
//! hands out sessions wired to both.

use std::sync::Arc;
use std::time::Duration;

use hookline_config::model::StorageConfig;
use hookline_core::types::{Endpoint, NewEndpoint};
use hookline_core::{HooklineError, TranscriptStore, WebhookTransport};
use hookline_session::{ConversationSession, SharedSession};
use hookline_storage::SqliteStore;

use crate::mock_transport::MockTransport;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<String>,
    delay: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            delay: None,
        }
    }

    /// Set mock transport replies.
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Make every mock send take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn build(self) -> Result<TestHarness, HooklineError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| HooklineError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let store = SqliteStore::open(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        })
        .await?;

        let mut transport = MockTransport::with_replies(self.replies);
        if let Some(delay) = self.delay {
            transport = transport.with_delay(delay);
        }

        Ok(TestHarness {
            store: Arc::new(store),
            transport: Arc::new(transport),
            _temp_dir: temp_dir,
        })
    }
}

/// A temp store plus a mock transport.
pub struct TestHarness {
    /// SQLite store on a temp file, removed on drop.
    pub store: Arc<SqliteStore>,
    pub transport: Arc<MockTransport>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A session wired to this harness's store and transport.
    pub fn session(&self) -> ConversationSession {
        let store: Arc<dyn TranscriptStore> = self.store.clone();
        let transport: Arc<dyn WebhookTransport> = self.transport.clone();
        ConversationSession::new(store, transport)
    }

    pub fn shared_session(&self) -> SharedSession {
        SharedSession::new(self.session())
    }

    /// Register an endpoint pointing at a fake URL.
    pub async fn create_endpoint(&self, name: &str) -> Result<Endpoint, HooklineError> {
        self.store
            .create_endpoint(NewEndpoint::new(name, "https://example.test/hook", "tok"))
            .await
    }
}
