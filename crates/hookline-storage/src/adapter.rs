// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`TranscriptStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use hookline_config::model::StorageConfig;
use hookline_core::types::{
    Conversation, ConversationId, Endpoint, EndpointId, EndpointSummary, Message, MessageId,
    NewEndpoint, NewMessage,
};
use hookline_core::{AdapterType, HealthStatus, HooklineError, PluginAdapter, TranscriptStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed transcript store.
///
/// The database is opened on the first call to
/// [`TranscriptStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store for the given configuration. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, HooklineError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    fn db(&self) -> Result<&Database, HooklineError> {
        self.db.get().ok_or_else(|| HooklineError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, HooklineError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TranscriptStore for SqliteStore {
    async fn initialize(&self) -> Result<(), HooklineError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| HooklineError::Storage {
            source: "storage already initialized".into(),
        })?;
        info!(path = %self.config.database_path, "transcript store ready");
        Ok(())
    }

    async fn close(&self) -> Result<(), HooklineError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn create_endpoint(&self, endpoint: NewEndpoint) -> Result<Endpoint, HooklineError> {
        let created = queries::endpoints::create_endpoint(self.db()?, endpoint).await?;
        debug!(endpoint_id = created.id, name = %created.name, "endpoint created");
        Ok(created)
    }

    async fn list_endpoints(&self) -> Result<Vec<EndpointSummary>, HooklineError> {
        queries::endpoints::list_endpoints(self.db()?).await
    }

    async fn get_endpoint(&self, id: EndpointId) -> Result<Endpoint, HooklineError> {
        queries::endpoints::get_endpoint(self.db()?, id).await
    }

    async fn delete_endpoint(&self, id: EndpointId) -> Result<(), HooklineError> {
        queries::endpoints::delete_endpoint(self.db()?, id).await?;
        debug!(endpoint_id = id, "endpoint deleted");
        Ok(())
    }

    async fn create_conversation(
        &self,
        endpoint_id: EndpointId,
    ) -> Result<Conversation, HooklineError> {
        queries::conversations::create_conversation(self.db()?, endpoint_id).await
    }

    async fn get_conversation(&self, id: ConversationId) -> Result<Conversation, HooklineError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, HooklineError> {
        queries::conversations::list_conversations(self.db()?).await
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<(), HooklineError> {
        queries::conversations::delete_conversation(self.db()?, id).await
    }

    async fn rename_conversation(
        &self,
        id: ConversationId,
        name: &str,
    ) -> Result<Conversation, HooklineError> {
        queries::conversations::rename_conversation(self.db()?, id, name).await
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, HooklineError> {
        queries::messages::append_message(self.db()?, message).await
    }

    async fn list_messages(&self, id: ConversationId) -> Result<Vec<Message>, HooklineError> {
        queries::messages::list_messages(self.db()?, id).await
    }

    async fn get_message(&self, id: MessageId) -> Result<Message, HooklineError> {
        queries::messages::get_message(self.db()?, id).await
    }

    async fn has_no_messages(&self, id: ConversationId) -> Result<bool, HooklineError> {
        queries::messages::has_no_messages(self.db()?, id).await
    }
}
