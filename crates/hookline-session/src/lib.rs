// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation session orchestration for Hookline.
//!
//! [`ConversationSession`] ties the transcript store and the webhook
//! transport together for one user. [`SharedSession`] wraps it for use from
//! concurrent request handlers.

pub mod session;
pub mod shared;
pub mod transcript;

pub use session::{ConversationSession, SendOutcome, SessionSnapshot, SessionState, title_preview};
pub use shared::SharedSession;
pub use transcript::{ERROR_PREFIX, GREETING, TranscriptEntry};
