// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound chat message delivery.

use async_trait::async_trait;

use crate::error::EmblemError;
use crate::traits::adapter::PluginAdapter;
use crate::types::DeliveryTarget;

/// Delivers user-visible text to a platform channel.
#[async_trait]
pub trait MessageSink: PluginAdapter {
    async fn send(&self, target: &DeliveryTarget, text: &str) -> Result<(), EmblemError>;
}
