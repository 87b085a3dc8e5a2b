// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hookline endpoint` and `hookline conversation` commands.

use std::io::Write;

use chrono::SecondsFormat;
use hookline_config::HooklineConfig;
use hookline_core::types::{Author, NewEndpoint};
use hookline_core::{HooklineError, TranscriptStore};
use hookline_storage::SqliteStore;

use crate::{ConversationCommand, EndpointCommand};

fn io_err(e: std::io::Error) -> HooklineError {
    HooklineError::Internal(format!("failed to write output: {e}"))
}

pub async fn run_endpoint(config: &HooklineConfig, cmd: EndpointCommand) -> Result<(), HooklineError> {
    let store = SqliteStore::open(config.storage.clone()).await?;
    let result = endpoint_command(&store, cmd, &mut std::io::stdout()).await;
    store.close().await?;
    result
}

pub async fn run_conversation(
    config: &HooklineConfig,
    cmd: ConversationCommand,
) -> Result<(), HooklineError> {
    let store = SqliteStore::open(config.storage.clone()).await?;
    let result = conversation_command(&store, cmd, &mut std::io::stdout()).await;
    store.close().await?;
    result
}

async fn endpoint_command(
    store: &dyn TranscriptStore,
    cmd: EndpointCommand,
    out: &mut impl Write,
) -> Result<(), HooklineError> {
    match cmd {
        EndpointCommand::Add {
            name,
            url,
            credential,
        } => {
            let endpoint = store
                .create_endpoint(NewEndpoint::new(name, url, credential))
                .await?;
            writeln!(out, "registered endpoint {} ({})", endpoint.id, endpoint.name).map_err(io_err)?;
        }
        EndpointCommand::List => {
            let endpoints = store.list_endpoints().await?;
            if endpoints.is_empty() {
                writeln!(out, "no endpoints registered").map_err(io_err)?;
            }
            for ep in endpoints {
                writeln!(out, "{:>4}  {:<20} {}", ep.id, ep.name, ep.url).map_err(io_err)?;
            }
        }
        EndpointCommand::Remove { id } => {
            store.delete_endpoint(id).await?;
            writeln!(out, "removed endpoint {id}").map_err(io_err)?;
        }
    }
    Ok(())
}

async fn conversation_command(
    store: &dyn TranscriptStore,
    cmd: ConversationCommand,
    out: &mut impl Write,
) -> Result<(), HooklineError> {
    match cmd {
        ConversationCommand::List => {
            let conversations = store.list_conversations().await?;
            if conversations.is_empty() {
                writeln!(out, "no conversations").map_err(io_err)?;
            }
            for c in conversations {
                writeln!(
                    out,
                    "{:>4}  {:<24} {} ({})",
                    c.id,
                    c.name,
                    c.endpoint_name,
                    c.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
                )
                .map_err(io_err)?;
            }
        }
        ConversationCommand::Show { id } => {
            let conversation = store.get_conversation(id).await?;
            let messages = store.list_messages(id).await?;
            writeln!(out, "{} [{}]", conversation.name, conversation.endpoint_name)
                .map_err(io_err)?;
            for m in messages {
                let who = match m.author {
                    Author::User => "you",
                    Author::Endpoint => "endpoint",
                };
                write!(
                    out,
                    "{} {who}: {}",
                    m.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                    m.content
                )
                .map_err(io_err)?;
                let line_end = match m.attachments.as_ref().map(|a| a.len()) {
                    Some(n) => writeln!(out, " (+{n} attachment(s))"),
                    None => writeln!(out),
                };
                line_end.map_err(io_err)?;
            }
        }
        ConversationCommand::Remove { id } => {
            store.delete_conversation(id).await?;
            writeln!(out, "removed conversation {id}").map_err(io_err)?;
        }
    }
    Ok(())
}
