// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use chrono::Utc;
use hookline_core::types::{Conversation, ConversationId, EndpointId};
use hookline_core::HooklineError;
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;
use crate::queries::{format_ts, parse_ts, truncate_ts};

const COLUMNS: &str = "id, endpoint_id, endpoint_name, name, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let created_at: String = row.get(4)?;
    Ok(Conversation {
        id: row.get(0)?,
        endpoint_id: row.get(1)?,
        endpoint_name: row.get(2)?,
        name: row.get(3)?,
        created_at: parse_ts(4, &created_at)?,
    })
}

/// Create a conversation for an endpoint. The endpoint's current name is
/// copied into the row and used as the initial display name.
pub async fn create_conversation(
    db: &Database,
    endpoint_id: EndpointId,
) -> Result<Conversation, HooklineError> {
    let created_at = truncate_ts(Utc::now());
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let endpoint_name: Option<String> = tx
                .query_row(
                    "SELECT name FROM endpoints WHERE id = ?1",
                    params![endpoint_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(endpoint_name) = endpoint_name else {
                return Ok(None);
            };
            tx.execute(
                "INSERT INTO conversations (endpoint_id, endpoint_name, name, created_at)
                 VALUES (?1, ?2, ?2, ?3)",
                params![endpoint_id, endpoint_name, format_ts(&created_at)],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Some(Conversation {
                id,
                endpoint_id,
                name: endpoint_name.clone(),
                endpoint_name,
                created_at,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::endpoint_not_found(endpoint_id))
}

/// Fetch one conversation.
pub async fn get_conversation(
    db: &Database,
    id: ConversationId,
) -> Result<Conversation, HooklineError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::conversation_not_found(id))
}

/// List all conversations, newest first.
pub async fn list_conversations(db: &Database) -> Result<Vec<Conversation>, HooklineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace a conversation's display name.
pub async fn rename_conversation(
    db: &Database,
    id: ConversationId,
    name: &str,
) -> Result<Conversation, HooklineError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE conversations SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                from_row,
            )
            .map(Some)
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::conversation_not_found(id))
}

/// Delete a conversation and its messages.
pub async fn delete_conversation(db: &Database, id: ConversationId) -> Result<(), HooklineError> {
    let removed = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM conversations WHERE id = ?1", params![id]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if removed == 0 {
        return Err(HooklineError::conversation_not_found(id));
    }
    Ok(())
}
