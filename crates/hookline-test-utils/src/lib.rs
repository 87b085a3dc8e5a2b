// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hookline integration tests.
//!
//! - [`MockTransport`] - scripted webhook replies, recorded requests
//! - [`TestHarness`] - temp SQLite store, mock transport, and sessions over both

pub mod harness;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_transport::{DEFAULT_REPLY, MockTransport, RecordedRequest};
