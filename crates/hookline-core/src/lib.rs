// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Hookline.
//!
//! Holds the error taxonomy, the shared record types, the attachment codec,
//! and the adapter traits the store and the transport implement.

pub mod attachment;
pub mod error;
pub mod traits;
pub mod types;

pub use attachment::{Attachment, AttachmentSet, AttachmentValue, RawFile};
pub use error::{HooklineError, ResourceKind};
pub use types::{
    AdapterType, Author, Conversation, ConversationId, Endpoint, EndpointId, EndpointSummary,
    HealthStatus, Message, MessageId, NewEndpoint, NewMessage, NormalizedReply,
};

pub use traits::{PluginAdapter, TranscriptStore, WebhookTransport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_resource() {
        let err = HooklineError::conversation_not_found(7);
        assert_eq!(err.to_string(), "conversation 7 not found");
        assert!(err.is_not_found());

        let err = HooklineError::endpoint_not_found(3);
        assert_eq!(err.to_string(), "endpoint 3 not found");
    }

    #[test]
    fn transport_error_keeps_status() {
        let err = HooklineError::transport("HTTP 500", Some(500));
        match err {
            HooklineError::Transport { status, .. } => assert_eq!(status, Some(500)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        for variant in [AdapterType::Store, AdapterType::Transport] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_store<T: TranscriptStore>() {}
        fn _assert_transport<T: WebhookTransport>() {}
    }
}
