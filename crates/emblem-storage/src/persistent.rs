// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory state mirrored to one JSON document.
//!
//! A [`PersistentMap`] owns its document for as long as it lives: it claims
//! the name on open and releases it on drop. The in-memory value is always
//! authoritative. Every mutation rewrites the whole document while the lock
//! is still held, so on-disk writes land in mutation order.

use std::sync::Arc;

use emblem_core::{DocumentStore, EmblemError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Generic persisted state over one document of shape `D`.
pub struct PersistentMap<D> {
    name: String,
    store: Arc<dyn DocumentStore>,
    state: Mutex<D>,
}

impl<D> PersistentMap<D>
where
    D: Default + Serialize + DeserializeOwned + Send + Sync,
{
    /// Claims `name` in `store` and starts with empty state.
    ///
    /// Call [`PersistentMap::load`] to pull in what is on disk.
    pub fn open(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Result<Self, EmblemError> {
        let name = name.into();
        store.claim(&name)?;
        Ok(Self {
            name,
            store,
            state: Mutex::new(D::default()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the in-memory state with the stored document.
    ///
    /// A missing document leaves the state empty. So does a document that
    /// cannot be read or parsed; that case is logged and otherwise ignored.
    pub async fn load(&self) {
        let loaded = match self.store.read(&self.name).await {
            Ok(Some(value)) => match serde_json::from_value::<D>(value) {
                Ok(state) => state,
                Err(e) => {
                    warn!(document = %self.name, error = %e, "malformed document, starting empty");
                    D::default()
                }
            },
            Ok(None) => D::default(),
            Err(e) => {
                warn!(document = %self.name, error = %e, "failed to read document, starting empty");
                D::default()
            }
        };
        *self.state.lock().await = loaded;
        debug!(document = %self.name, "document loaded");
    }

    /// Runs `f` against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Runs `f` against the state, then rewrites the whole document.
    ///
    /// A failed write is logged and swallowed; the in-memory change stands
    /// and is flushed again with the next mutation.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let mut state = self.state.lock().await;
        let result = f(&mut state);
        self.persist(&state).await;
        result
    }

    async fn persist(&self, state: &D) {
        let value = match serde_json::to_value(state) {
            Ok(value) => value,
            Err(e) => {
                warn!(document = %self.name, error = %e, "failed to serialize document");
                return;
            }
        };
        if let Err(e) = self.store.write(&self.name, &value).await {
            warn!(document = %self.name, error = %e, "failed to persist document");
        }
    }
}

impl<D> Drop for PersistentMap<D> {
    fn drop(&mut self) {
        self.store.release(&self.name);
    }
}
