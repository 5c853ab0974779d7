// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable JSON document storage backing the state managers.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EmblemError;
use crate::traits::adapter::PluginAdapter;

/// Whole-document JSON persistence. Last write wins.
#[async_trait]
pub trait DocumentStore: PluginAdapter {
    /// Reads a document. A missing document is `Ok(None)`, not an error.
    async fn read(&self, name: &str) -> Result<Option<Value>, EmblemError>;

    /// Replaces a document with `value`.
    async fn write(&self, name: &str, value: &Value) -> Result<(), EmblemError>;

    /// Registers the single owner of a document.
    ///
    /// Fails if the document has already been claimed in this process.
    fn claim(&self, name: &str) -> Result<(), EmblemError>;

    /// Gives up ownership taken with [`DocumentStore::claim`].
    fn release(&self, name: &str);
}
