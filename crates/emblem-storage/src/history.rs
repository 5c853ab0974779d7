// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only log of published avatars, grouped by broadcaster then user.

use std::collections::BTreeMap;
use std::sync::Arc;

use emblem_core::{DocumentStore, EmblemError, ImageHistoryRecord, normalize_key};

use crate::persistent::PersistentMap;

pub const IMAGE_HISTORY_DOCUMENT: &str = "image_history";

type History = BTreeMap<String, BTreeMap<String, Vec<ImageHistoryRecord>>>;

pub struct ImageHistoryStore {
    map: PersistentMap<History>,
}

impl ImageHistoryStore {
    pub fn open(store: Arc<dyn DocumentStore>) -> Result<Self, EmblemError> {
        Ok(Self {
            map: PersistentMap::open(store, IMAGE_HISTORY_DOCUMENT)?,
        })
    }

    pub async fn load(&self) {
        self.map.load().await;
    }

    /// Appends `record` and returns how many images `user` now has in this channel.
    pub async fn append(&self, broadcaster: &str, user: &str, record: ImageHistoryRecord) -> usize {
        let channel = normalize_key(broadcaster);
        let user = normalize_key(user);
        self.map
            .mutate(|history| {
                let records = history.entry(channel).or_default().entry(user).or_default();
                records.push(record);
                records.len()
            })
            .await
    }

    pub async fn count(&self, broadcaster: &str, user: &str) -> usize {
        let channel = normalize_key(broadcaster);
        let user = normalize_key(user);
        self.map
            .read(|history| {
                history
                    .get(&channel)
                    .and_then(|users| users.get(&user))
                    .map_or(0, Vec::len)
            })
            .await
    }

    /// Records for `user` in this channel, oldest first.
    pub async fn records(&self, broadcaster: &str, user: &str) -> Vec<ImageHistoryRecord> {
        let channel = normalize_key(broadcaster);
        let user = normalize_key(user);
        self.map
            .read(|history| {
                history
                    .get(&channel)
                    .and_then(|users| users.get(&user))
                    .cloned()
                    .unwrap_or_default()
            })
            .await
    }
}
