// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Emblem.

use thiserror::Error;

use crate::types::Stage;

/// The primary error type used across all Emblem adapters and the generation pipeline.
#[derive(Debug, Error)]
pub enum EmblemError {
    /// Configuration errors (missing credentials, invalid values). Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage errors (file read/write, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream transport or HTTP failure (network, 5xx, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream service declined to produce content (moderation, quota, empty reply).
    #[error("{provider} refused: {reason}")]
    ProviderRefusal { provider: String, reason: String },

    /// A generation pipeline stage failed.
    #[error("stage {stage} failed: {message}")]
    Stage { stage: Stage, message: String },

    /// Outbound message delivery failed.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Retry loop ended without ever capturing an error.
    #[error("retry exhausted without error")]
    RetryExhausted,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EmblemError {
    /// Wraps an error as a failure of the given pipeline stage.
    ///
    /// Stage errors pass through unchanged so nested stages keep the innermost tag.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            EmblemError::Stage { .. } => self,
            other => EmblemError::Stage {
                stage,
                message: other.to_string(),
            },
        }
    }

    /// Shorthand for a storage error built from any boxed source.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        EmblemError::Storage {
            source: source.into(),
        }
    }
}
