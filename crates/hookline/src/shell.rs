// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hookline shell` command implementation.
//!
//! A readline REPL over one [`ConversationSession`]. Each line is sent as a
//! turn; `/attach <path>` queues a file for the next turn and
//! `/save <key> <path>` writes an attachment shown in the transcript to disk.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use hookline_config::HooklineConfig;
use hookline_core::attachment::{Attachment, RawFile};
use hookline_core::types::{Author, ConversationId, EndpointId};
use hookline_core::{HooklineError, TranscriptStore, WebhookTransport};
use hookline_session::{ConversationSession, TranscriptEntry};
use hookline_storage::SqliteStore;
use hookline_webhook::HttpWebhookTransport;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

/// One parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Quit,
    Clear,
    Attach(PathBuf),
    Save { key: String, path: PathBuf },
    Help,
    Unknown(String),
    Send(String),
    Empty,
}

fn parse_command(line: &str) -> ShellCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ShellCommand::Send(trimmed.to_string());
    };
    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((rest, ""));
    match name {
        "quit" | "exit" => ShellCommand::Quit,
        "clear" => ShellCommand::Clear,
        "help" => ShellCommand::Help,
        "attach" if !arg.is_empty() => ShellCommand::Attach(PathBuf::from(arg)),
        "save" => match arg.split_once(char::is_whitespace) {
            Some((key, path)) if !path.trim().is_empty() => ShellCommand::Save {
                key: key.to_string(),
                path: PathBuf::from(path.trim()),
            },
            _ => ShellCommand::Unknown(trimmed.to_string()),
        },
        _ => ShellCommand::Unknown(trimmed.to_string()),
    }
}

/// Renders one transcript entry for the terminal.
fn render_entry(entry: &TranscriptEntry) -> String {
    let who = match entry.author {
        Author::User => "you".cyan().bold(),
        Author::Endpoint if entry.is_error() => "hookline".red().bold(),
        Author::Endpoint => "endpoint".green().bold(),
    };
    let mut out = format!("{who}: {}", entry.content);
    if let Some(attachments) = &entry.attachments {
        for (key, value) in attachments.iter() {
            let label = match value.as_inline() {
                Some(a) => format!("{} ({}, {})", a.file_name, a.mime_type, a.file_size),
                None => "inline data".to_string(),
            };
            out.push_str(&format!("\n  {} {label}", format!("[{key}]").dimmed()));
        }
    }
    out
}

/// The most recent attachment stored under `key` in the transcript.
fn find_attachment<'a>(
    transcript: &'a [TranscriptEntry],
    key: &str,
) -> Result<&'a Attachment, HooklineError> {
    let value = transcript
        .iter()
        .rev()
        .find_map(|entry| entry.attachments.as_ref()?.get(key))
        .ok_or_else(|| HooklineError::Validation(format!("no attachment {key} in this transcript")))?;
    value
        .as_inline()
        .ok_or_else(|| HooklineError::MalformedPayload(format!("{key} is not an inline file")))
}

async fn save_attachment(
    transcript: &[TranscriptEntry],
    key: &str,
    path: &std::path::Path,
) -> Result<usize, HooklineError> {
    let bytes = find_attachment(transcript, key)?.decode()?;
    tokio::fs::write(path, &bytes).await.map_err(|e| {
        HooklineError::Internal(format!("cannot write {}: {e}", path.display()))
    })?;
    Ok(bytes.len())
}

fn print_help() {
    println!("  {}  queue a file for the next message", "/attach <path>".yellow());
    println!("  {}  write an attachment to disk", "/save <key> <path>".yellow());
    println!("  {}          clear the screen transcript", "/clear".yellow());
    println!("  {}           leave the shell", "/quit".yellow());
}

/// Runs the `hookline shell` interactive REPL.
pub async fn run_shell(
    config: HooklineConfig,
    endpoint_id: EndpointId,
    conversation: Option<ConversationId>,
) -> Result<(), HooklineError> {
    let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
    let transport: Arc<dyn WebhookTransport> =
        Arc::new(HttpWebhookTransport::new(&config.transport)?);
    let mut session = ConversationSession::new(store.clone() as Arc<dyn TranscriptStore>, transport);

    match conversation {
        Some(id) => {
            session.open(id).await?;
            if session.active_endpoint().map(|e| e.id) != Some(endpoint_id) {
                warn!(
                    conversation_id = id,
                    endpoint_id, "conversation belongs to a different endpoint, using its own"
                );
            }
        }
        None => {
            session.start_conversation(endpoint_id).await?;
        }
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| HooklineError::Internal(format!("failed to initialize readline: {e}")))?;

    let endpoint_name = session
        .active_endpoint()
        .map(|e| e.name.clone())
        .unwrap_or_default();
    println!("{} {}", "hookline shell".bold().green(), endpoint_name.bold());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());
    for entry in session.transcript() {
        println!("{}", render_entry(entry));
    }

    let prompt = format!("{}> ", endpoint_name.green());
    let mut pending: Vec<RawFile> = Vec::new();
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match parse_command(&line) {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => print_help(),
            ShellCommand::Clear => {
                session.clear();
                pending.clear();
                println!("{}", "transcript cleared".dimmed());
            }
            ShellCommand::Unknown(cmd) => {
                eprintln!("{}: unknown command {cmd}", "error".red());
            }
            ShellCommand::Attach(path) => match RawFile::from_path(&path).await {
                Ok(file) => {
                    if !file.is_image() {
                        println!(
                            "{}",
                            format!("{} is not an image and will not be sent", file.name).yellow()
                        );
                    }
                    println!("{}", format!("queued {}", file.name).dimmed());
                    pending.push(file);
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            ShellCommand::Save { key, path } => {
                match save_attachment(session.transcript(), &key, &path).await {
                    Ok(len) => {
                        println!("{}", format!("saved {len} bytes to {}", path.display()).dimmed())
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            ShellCommand::Send(text) => {
                let _ = rl.add_history_entry(&line);
                let files = std::mem::take(&mut pending);
                match session.send(&text, &files).await {
                    Ok(outcome) => {
                        if let Some(conversation) = &outcome.renamed {
                            println!("{}", format!("conversation: {}", conversation.name).dimmed());
                        }
                        println!("{}", render_entry(&outcome.entry));
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
        }
    }

    store.close().await?;
    println!("{}", "goodbye".dimmed());
    Ok(())
}
