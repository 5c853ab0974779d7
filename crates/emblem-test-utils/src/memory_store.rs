// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`DocumentStore`] with write-failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use emblem_core::{AdapterType, DocumentStore, EmblemError, PluginAdapter};
use serde_json::Value;

/// Documents live in a map; claims are scoped to this instance.
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, Value>>,
    claimed: Mutex<HashSet<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            claimed: Mutex::new(HashSet::new()),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seeds a document before any manager loads it.
    pub fn with_document(self, name: &str, value: Value) -> Self {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(name.to_string(), value);
        }
        self
    }

    /// Current stored content of `name`.
    pub fn document(&self, name: &str) -> Option<Value> {
        self.documents.lock().ok()?.get(name).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginAdapter for MemoryDocumentStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }
}

fn poisoned() -> EmblemError {
    EmblemError::Internal("memory store lock poisoned".into())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, name: &str) -> Result<Option<Value>, EmblemError> {
        let documents = self.documents.lock().map_err(|_| poisoned())?;
        Ok(documents.get(name).cloned())
    }

    async fn write(&self, name: &str, value: &Value) -> Result<(), EmblemError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(EmblemError::storage(format!("injected write failure for {name}")));
        }
        let mut documents = self.documents.lock().map_err(|_| poisoned())?;
        documents.insert(name.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn claim(&self, name: &str) -> Result<(), EmblemError> {
        let mut claimed = self.claimed.lock().map_err(|_| poisoned())?;
        if !claimed.insert(name.to_string()) {
            return Err(EmblemError::storage(format!("{name} is already claimed")));
        }
        Ok(())
    }

    fn release(&self, name: &str) {
        if let Ok(mut claimed) = self.claimed.lock() {
            claimed.remove(name);
        }
    }
}
