// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message sink that captures outbound chat lines for assertions.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use emblem_core::{AdapterType, DeliveryTarget, EmblemError, MessageSink, PluginAdapter};
use tokio::sync::Mutex;

pub struct RecordingSink {
    sent: Mutex<Vec<(DeliveryTarget, String)>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every send fail until reset.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<(DeliveryTarget, String)> {
        self.sent.lock().await.clone()
    }

    /// Just the message texts, in send order.
    pub async fn texts(&self) -> Vec<String> {
        self.sent.lock().await.iter().map(|(_, text)| text.clone()).collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginAdapter for RecordingSink {
    fn name(&self) -> &str {
        "recording-sink"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, target: &DeliveryTarget, text: &str) -> Result<(), EmblemError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmblemError::Channel {
                message: "recording sink set to fail".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push((target.clone(), text.to_string()));
        Ok(())
    }
}
