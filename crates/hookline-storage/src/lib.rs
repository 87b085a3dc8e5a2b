// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite transcript store for Hookline.
//!
//! WAL-mode SQLite with embedded migrations, a single writer thread via
//! `tokio-rusqlite`, and cascading deletes from endpoints to conversations
//! to messages.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
