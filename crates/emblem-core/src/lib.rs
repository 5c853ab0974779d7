// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Emblem.
//!
//! This crate provides the error taxonomy, the domain types shared by the
//! generation pipeline and the state stores, and the adapter traits every
//! external collaborator (chat completion, image generation, hosting,
//! document storage, message delivery) implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::EmblemError;
pub use types::{
    AdapterType, ChatMessage, DeliveryTarget, EventMetadata, GenerationOutcome,
    GenerationRequest, GenerationResult, ImageHistoryRecord, ImageOptions, ImageProvider,
    Platform, Role, Stage, TriggerKind, UploadMetadata, normalize_key, parse_size,
};

pub use traits::{
    ChatCompletion, DocumentStore, ImageGenerator, ImageHost, MessageSink, PluginAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emblem_error_has_all_variants() {
        let _config = EmblemError::Config("test".into());
        let _storage = EmblemError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = EmblemError::Provider {
            message: "test".into(),
            source: None,
        };
        let _refusal = EmblemError::ProviderRefusal {
            provider: "openai".into(),
            reason: "moderation".into(),
        };
        let _stage = EmblemError::Stage {
            stage: Stage::Analyze,
            message: "test".into(),
        };
        let _channel = EmblemError::Channel {
            message: "test".into(),
            source: None,
        };
        let _exhausted = EmblemError::RetryExhausted;
        let _internal = EmblemError::Internal("test".into());
    }

    #[test]
    fn in_stage_wraps_once() {
        let err = EmblemError::Provider {
            message: "timeout".into(),
            source: None,
        }
        .in_stage(Stage::Analyze)
        .in_stage(Stage::Publish);

        match err {
            EmblemError::Stage { stage, message } => {
                assert_eq!(stage, Stage::Analyze);
                assert!(message.contains("timeout"), "got: {message}");
            }
            other => panic!("expected stage error, got {other:?}"),
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_chat<T: ChatCompletion>() {}
        fn _assert_image<T: ImageGenerator>() {}
        fn _assert_host<T: ImageHost>() {}
        fn _assert_store<T: DocumentStore>() {}
        fn _assert_sink<T: MessageSink>() {}
    }
}
