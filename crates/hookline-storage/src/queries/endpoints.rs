// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint CRUD operations.

use chrono::Utc;
use hookline_core::types::{Endpoint, EndpointId, EndpointSummary, NewEndpoint};
use hookline_core::HooklineError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::queries::{format_ts, parse_ts, truncate_ts};

/// Register a new endpoint. Fails with `Validation` on bad input or a
/// duplicate name, leaving the table untouched.
pub async fn create_endpoint(db: &Database, new: NewEndpoint) -> Result<Endpoint, HooklineError> {
    new.validate()?;
    let name = new.name.trim().to_string();
    let duplicate_name = name.clone();
    let created_at = truncate_ts(Utc::now());

    let inserted = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM endpoints WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(None);
            }
            tx.execute(
                "INSERT INTO endpoints (name, url, credential, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, new.url, new.credential, format_ts(&created_at)],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Some(Endpoint {
                id,
                name,
                url: new.url,
                credential: new.credential,
                created_at,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    inserted.ok_or_else(|| {
        HooklineError::Validation(format!("an endpoint named `{duplicate_name}` already exists"))
    })
}

/// List every endpoint, oldest first, without credentials.
pub async fn list_endpoints(db: &Database) -> Result<Vec<EndpointSummary>, HooklineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, url, created_at FROM endpoints ORDER BY created_at, id",
            )?;
            let rows = stmt.query_map([], |row| {
                let created_at: String = row.get(3)?;
                Ok(EndpointSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                    created_at: parse_ts(3, &created_at)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one endpoint with its credential.
pub async fn get_endpoint(db: &Database, id: EndpointId) -> Result<Endpoint, HooklineError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, url, credential, created_at FROM endpoints WHERE id = ?1",
                params![id],
                |row| {
                    let created_at: String = row.get(4)?;
                    Ok(Endpoint {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        url: row.get(2)?,
                        credential: row.get(3)?,
                        created_at: parse_ts(4, &created_at)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| HooklineError::endpoint_not_found(id))
}

/// Delete an endpoint; its conversations and their messages go with it.
pub async fn delete_endpoint(db: &Database, id: EndpointId) -> Result<(), HooklineError> {
    let removed = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM endpoints WHERE id = ?1", params![id]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if removed == 0 {
        return Err(HooklineError::endpoint_not_found(id));
    }
    Ok(())
}
