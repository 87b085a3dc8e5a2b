// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST gateway for Hookline.
//!
//! Exposes the transcript store under `/api/endpoints`, `/api/conversations`
//! and `/api/messages`, and one shared conversation session under
//! `/api/session`.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, MAX_UPLOAD_BYTES, router, start_server};
