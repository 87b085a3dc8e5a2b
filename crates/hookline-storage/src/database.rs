// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. `Database` is the single writer; query modules take `&Database`
//! and go through [`Database::connection`]. Do not open extra connections
//! for writes.

use std::path::Path;

use hookline_core::HooklineError;
use tracing::debug;

/// Handle to the transcript database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and migrate it.
    pub async fn open(path: &str) -> Result<Self, HooklineError> {
        Self::open_with(path, true).await
    }

    /// Open with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, HooklineError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| HooklineError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| HooklineError::Storage {
                source: e.to_string().into(),
            })?;

        let journal = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| -> Result<Result<(), HooklineError>, rusqlite::Error> {
            apply_pragmas(conn, journal)?;
            Ok(crate::migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), HooklineError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), HooklineError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// `journal_mode` reports the resulting mode as a row, so it goes through
/// `query_row` rather than `execute_batch`.
fn apply_pragmas(conn: &mut rusqlite::Connection, journal: &str) -> rusqlite::Result<()> {
    let _mode: String = conn.query_row(&format!("PRAGMA journal_mode = {journal}"), [], |row| {
        row.get(0)
    })?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// Wraps a tokio-rusqlite error as [`HooklineError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HooklineError {
    HooklineError::Storage {
        source: Box::new(e),
    }
}
