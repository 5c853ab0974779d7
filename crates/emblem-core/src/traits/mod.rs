// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the external collaborators the core consumes.
//!
//! All adapters extend [`PluginAdapter`] and use `#[async_trait]` so they
//! can be held as `Arc<dyn …>` and swapped for mocks in tests.

pub mod adapter;
pub mod chat;
pub mod hosting;
pub mod image;
pub mod sink;
pub mod storage;

pub use adapter::PluginAdapter;
pub use chat::ChatCompletion;
pub use hosting::ImageHost;
pub use image::ImageGenerator;
pub use sink::MessageSink;
pub use storage::DocumentStore;
