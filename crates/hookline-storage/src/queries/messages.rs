// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations. Messages are append-only.

use hookline_core::attachment::AttachmentSet;
use hookline_core::types::{Author, ConversationId, Message, MessageId, NewMessage};
use hookline_core::HooklineError;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::Database;
use crate::queries::{format_ts, parse_ts, truncate_ts};

fn conversation_exists(conn: &Connection, id: ConversationId) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM conversations WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

fn encode_attachments(set: Option<&AttachmentSet>) -> Result<Option<String>, HooklineError> {
    // An empty set is stored as NULL, same as no attachments.
    set.filter(|s| !s.is_empty())
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| HooklineError::Storage {
            source: Box::new(e),
        })
}

fn decode_attachments(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<AttachmentSet>> {
    raw.map(|json| {
        serde_json::from_str::<AttachmentSet>(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
    .map(|set| set.and_then(AttachmentSet::into_non_empty))
}

const MESSAGE_COLUMNS: &str = "id, conversation_id, content, is_user, timestamp, data";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let is_user: bool = row.get(3)?;
    let timestamp: String = row.get(4)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        author: Author::from_is_user(is_user),
        timestamp: parse_ts(4, &timestamp)?,
        attachments: decode_attachments(5, row.get(5)?)?,
    })
}

/// Append a message to an existing conversation.
pub async fn append_message(db: &Database, message: NewMessage) -> Result<Message, HooklineError> {
    let data = encode_attachments(message.attachments.as_ref())?;
    let timestamp = truncate_ts(message.timestamp);
    let conversation_id = message.conversation_id;

    db.connection()
        .call(move |conn| {
            if !conversation_exists(conn, conversation_id)? {
                return Ok(None);
            }
            conn.execute(
                "INSERT INTO messages (conversation_id, content, is_user, timestamp, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation_id,
                    message.content,
                    message.author.is_user(),
                    format_ts(&timestamp),
                    data,
                ],
            )?;
            Ok(Some(Message {
                id: conn.last_insert_rowid(),
                conversation_id,
                content: message.content,
                author: message.author,
                timestamp,
                attachments: message.attachments.and_then(AttachmentSet::into_non_empty),
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::conversation_not_found(conversation_id))
}

/// All messages of a conversation, oldest first.
pub async fn list_messages(
    db: &Database,
    conversation_id: ConversationId,
) -> Result<Vec<Message>, HooklineError> {
    db.connection()
        .call(move |conn| {
            if !conversation_exists(conn, conversation_id)? {
                return Ok(None);
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?1
                 ORDER BY timestamp ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id], message_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map(Some)
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::conversation_not_found(conversation_id))
}

/// Look up a single message by id.
pub async fn get_message(db: &Database, id: MessageId) -> Result<Message, HooklineError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                message_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::message_not_found(id))
}

/// True when the conversation exists and has no messages yet.
pub async fn has_no_messages(
    db: &Database,
    conversation_id: ConversationId,
) -> Result<bool, HooklineError> {
    db.connection()
        .call(move |conn| {
            if !conversation_exists(conn, conversation_id)? {
                return Ok(None);
            }
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )?;
            Ok(Some(count == 0))
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::conversation_not_found(conversation_id))
}
