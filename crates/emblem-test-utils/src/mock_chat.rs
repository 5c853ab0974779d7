// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat-completion adapter for deterministic testing.
//!
//! Replies are popped from a FIFO script. When the script is empty the
//! default reply is returned, or an error if the mock is set to always fail.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use emblem_core::{AdapterType, ChatCompletion, ChatMessage, EmblemError, PluginAdapter};
use tokio::sync::Mutex;

pub const DEFAULT_CHAT_REPLY: &str = "A cheerful fox wearing a knitted scarf.";

pub struct MockChat {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    always_fail: AtomicBool,
}

impl MockChat {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            always_fail: AtomicBool::new(false),
        }
    }

    /// A mock pre-loaded with successful replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            ..Self::new()
        }
    }

    pub async fn push_response(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Ok(text.into()));
    }

    /// Queues a provider error carrying `message`.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Err(message.into()));
    }

    /// Fail every unscripted call.
    pub fn set_always_fail(&self, fail: bool) {
        self.always_fail.store(fail, Ordering::SeqCst);
    }

    /// Every message history passed to `complete`, in call order.
    pub async fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockChat {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginAdapter for MockChat {
    fn name(&self) -> &str {
        "mock-chat"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Chat
    }
}

#[async_trait]
impl ChatCompletion for MockChat {
    async fn complete(&self, messages: &[ChatMessage], _max_tokens: u32) -> Result<String, EmblemError> {
        self.requests.lock().await.push(messages.to_vec());

        let scripted = self.script.lock().await.pop_front();
        let reply = match scripted {
            Some(reply) => reply,
            None if self.always_fail.load(Ordering::SeqCst) => Err("mock chat unavailable".to_string()),
            None => Ok(DEFAULT_CHAT_REPLY.to_string()),
        };

        reply.map_err(|message| EmblemError::Provider {
            message,
            source: None,
        })
    }
}
