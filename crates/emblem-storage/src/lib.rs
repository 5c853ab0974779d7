// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON document persistence for Emblem.
//!
//! One document per state domain, each owned by exactly one in-memory
//! manager for the life of the process:
//!
//! | document | shape |
//! |----------|-------|
//! | `themes.json` | `{broadcaster: theme}` |
//! | `meanings.json` | `{user: meaning}` |
//! | `ignores.json` | `[user, ...]` |
//! | `banned_gifters.json` | `{broadcaster: [gifter, ...]}` |
//! | `image_history.json` | `{broadcaster: {user: [record, ...]}}` |

pub mod file;
pub mod history;
pub mod managers;
pub mod persistent;

use std::path::PathBuf;
use std::sync::Arc;

use emblem_core::{DocumentStore, EmblemError};
use tracing::info;

pub use file::JsonFileStore;
pub use history::ImageHistoryStore;
pub use managers::{BannedGifterManager, IgnoreManager, MeaningManager, ThemeManager};
pub use persistent::PersistentMap;

/// Every state manager, opened and loaded once at startup.
///
/// Share it by `Arc`; opening a second bundle on the same store fails.
pub struct StateStores {
    pub themes: ThemeManager,
    pub meanings: MeaningManager,
    pub ignores: IgnoreManager,
    pub banned_gifters: BannedGifterManager,
    pub history: ImageHistoryStore,
}

impl StateStores {
    /// Claims and loads all five documents from `store`.
    pub async fn open(store: Arc<dyn DocumentStore>) -> Result<Self, EmblemError> {
        let stores = Self {
            themes: ThemeManager::open(Arc::clone(&store))?,
            meanings: MeaningManager::open(Arc::clone(&store))?,
            ignores: IgnoreManager::open(Arc::clone(&store))?,
            banned_gifters: BannedGifterManager::open(Arc::clone(&store))?,
            history: ImageHistoryStore::open(Arc::clone(&store))?,
        };

        stores.themes.load().await;
        stores.meanings.load().await;
        stores.ignores.load().await;
        stores.banned_gifters.load().await;
        stores.history.load().await;

        info!(store = store.name(), "state documents loaded");
        Ok(stores)
    }

    /// Opens the JSON-file stores under `data_dir`.
    pub async fn open_dir(data_dir: impl Into<PathBuf>) -> Result<Self, EmblemError> {
        Self::open(Arc::new(JsonFileStore::new(data_dir))).await
    }
}
