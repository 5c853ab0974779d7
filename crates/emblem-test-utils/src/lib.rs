// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Emblem integration tests.
//!
//! Provides mock adapters and harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockChat`] - chat completion with scripted replies and failures
//! - [`MockImageGenerator`] / [`MockImageHost`] - image generation and hosting
//! - [`MemoryDocumentStore`] - in-memory documents with write-failure injection
//! - [`RecordingSink`] - captures outbound chat lines
//! - [`PipelineHarness`] - all of the above wired to a real pipeline and dispatcher

pub mod harness;
pub mod memory_store;
pub mod mock_chat;
pub mod mock_image;
pub mod recording_sink;

pub use harness::{PipelineHarness, PipelineHarnessBuilder};
pub use memory_store::MemoryDocumentStore;
pub use mock_chat::{DEFAULT_CHAT_REPLY, MockChat};
pub use mock_image::{MockImageGenerator, MockImageHost};
pub use recording_sink::RecordingSink;
