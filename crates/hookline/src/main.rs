// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hookline - chat with webhook endpoints.
//!
//! This is the binary entry point.

mod admin;
mod serve;
mod shell;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use hookline_config::HooklineConfig;
use hookline_core::types::{ConversationId, EndpointId};

/// Hookline - chat with webhook endpoints.
#[derive(Parser, Debug)]
#[command(name = "hookline", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the REST gateway.
    Serve,
    /// Chat with an endpoint in an interactive REPL.
    Shell {
        /// Endpoint to talk to.
        endpoint: EndpointId,
        /// Continue this conversation instead of starting a new one.
        #[arg(long)]
        conversation: Option<ConversationId>,
    },
    /// Manage registered endpoints.
    #[command(subcommand)]
    Endpoint(EndpointCommand),
    /// Inspect and remove stored conversations.
    #[command(subcommand)]
    Conversation(ConversationCommand),
}

#[derive(Subcommand, Debug)]
pub enum EndpointCommand {
    /// Register a webhook endpoint.
    Add {
        name: String,
        url: String,
        /// Bearer credential sent with every request.
        #[arg(long)]
        credential: String,
    },
    /// List endpoints (credentials are never shown).
    List,
    /// Remove an endpoint and all its conversations.
    Remove { id: EndpointId },
}

#[derive(Subcommand, Debug)]
pub enum ConversationCommand {
    /// List conversations, newest first.
    List,
    /// Print every message of a conversation.
    Show { id: ConversationId },
    /// Remove a conversation and its messages.
    Remove { id: ConversationId },
}

fn load_config(path: Option<&PathBuf>) -> HooklineConfig {
    let loaded = match path {
        Some(path) => hookline_config::load_and_validate_path(path),
        None => hookline_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            hookline_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hookline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell {
            endpoint,
            conversation,
        }) => shell::run_shell(config, endpoint, conversation).await,
        Some(Commands::Endpoint(cmd)) => admin::run_endpoint(&config, cmd).await,
        Some(Commands::Conversation(cmd)) => admin::run_conversation(&config, cmd).await,
        None => {
            println!("hookline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}
