// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completion service consumed by the analysis and scenario stages.

use async_trait::async_trait;

use crate::error::EmblemError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ChatMessage;

/// A chat-completion API.
#[async_trait]
pub trait ChatCompletion: PluginAdapter {
    /// Completes the conversation and returns the assistant text.
    ///
    /// Implementations must return an error rather than an empty string when
    /// the provider refuses or produces no content.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, EmblemError>;
}
