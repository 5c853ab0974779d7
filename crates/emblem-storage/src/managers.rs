// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel customization state.
//!
//! Every key (broadcaster, user, gifter) is normalized with
//! [`normalize_key`] on the way in, so lookups are case-insensitive.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use emblem_core::{DocumentStore, EmblemError, normalize_key};

use crate::persistent::PersistentMap;

pub const THEMES_DOCUMENT: &str = "themes";
pub const MEANINGS_DOCUMENT: &str = "meanings";
pub const IGNORES_DOCUMENT: &str = "ignores";
pub const BANNED_GIFTERS_DOCUMENT: &str = "banned_gifters";

/// Broadcaster → theme text.
pub struct ThemeManager {
    map: PersistentMap<BTreeMap<String, String>>,
}

impl ThemeManager {
    pub fn open(store: Arc<dyn DocumentStore>) -> Result<Self, EmblemError> {
        Ok(Self {
            map: PersistentMap::open(store, THEMES_DOCUMENT)?,
        })
    }

    pub async fn load(&self) {
        self.map.load().await;
    }

    /// The broadcaster's theme, or an empty string when none is set.
    pub async fn get(&self, broadcaster: &str) -> String {
        let key = normalize_key(broadcaster);
        self.map
            .read(|themes| themes.get(&key).cloned().unwrap_or_default())
            .await
    }

    pub async fn set(&self, broadcaster: &str, theme: &str) {
        let key = normalize_key(broadcaster);
        let theme = theme.trim().to_string();
        self.map
            .mutate(|themes| {
                themes.insert(key, theme);
            })
            .await;
    }

    /// Clears the theme. Returns whether one was set.
    pub async fn remove(&self, broadcaster: &str) -> bool {
        let key = normalize_key(broadcaster);
        self.map.mutate(|themes| themes.remove(&key).is_some()).await
    }
}

/// Username → the meaning the image should convey instead of the literal name.
pub struct MeaningManager {
    map: PersistentMap<BTreeMap<String, String>>,
}

impl MeaningManager {
    pub fn open(store: Arc<dyn DocumentStore>) -> Result<Self, EmblemError> {
        Ok(Self {
            map: PersistentMap::open(store, MEANINGS_DOCUMENT)?,
        })
    }

    pub async fn load(&self) {
        self.map.load().await;
    }

    /// The override for `user`, if any.
    pub async fn lookup(&self, user: &str) -> Option<String> {
        let key = normalize_key(user);
        self.map.read(|meanings| meanings.get(&key).cloned()).await
    }

    /// The override for `user`, falling back to the normalized username.
    pub async fn get(&self, user: &str) -> String {
        match self.lookup(user).await {
            Some(meaning) => meaning,
            None => normalize_key(user),
        }
    }

    pub async fn set(&self, user: &str, meaning: &str) {
        let key = normalize_key(user);
        let meaning = meaning.trim().to_string();
        self.map
            .mutate(|meanings| {
                meanings.insert(key, meaning);
            })
            .await;
    }

    pub async fn remove(&self, user: &str) -> bool {
        let key = normalize_key(user);
        self.map.mutate(|meanings| meanings.remove(&key).is_some()).await
    }
}

/// Users who opted out of avatar generation. Stored as a flat array.
pub struct IgnoreManager {
    set: PersistentMap<BTreeSet<String>>,
}

impl IgnoreManager {
    pub fn open(store: Arc<dyn DocumentStore>) -> Result<Self, EmblemError> {
        Ok(Self {
            set: PersistentMap::open(store, IGNORES_DOCUMENT)?,
        })
    }

    pub async fn load(&self) {
        self.set.load().await;
    }

    pub async fn is_ignored(&self, user: &str) -> bool {
        let key = normalize_key(user);
        self.set.read(|ignored| ignored.contains(&key)).await
    }

    /// Returns `false` if the user was already ignored.
    pub async fn add(&self, user: &str) -> bool {
        let key = normalize_key(user);
        self.set.mutate(|ignored| ignored.insert(key)).await
    }

    pub async fn remove(&self, user: &str) -> bool {
        let key = normalize_key(user);
        self.set.mutate(|ignored| ignored.remove(&key)).await
    }

    pub async fn list(&self) -> Vec<String> {
        self.set.read(|ignored| ignored.iter().cloned().collect()).await
    }
}

/// Broadcaster → gifters whose gift subscriptions are not rewarded.
pub struct BannedGifterManager {
    map: PersistentMap<BTreeMap<String, BTreeSet<String>>>,
}

impl BannedGifterManager {
    pub fn open(store: Arc<dyn DocumentStore>) -> Result<Self, EmblemError> {
        Ok(Self {
            map: PersistentMap::open(store, BANNED_GIFTERS_DOCUMENT)?,
        })
    }

    pub async fn load(&self) {
        self.map.load().await;
    }

    pub async fn is_banned(&self, broadcaster: &str, gifter: &str) -> bool {
        let channel = normalize_key(broadcaster);
        let gifter = normalize_key(gifter);
        self.map
            .read(|banned| banned.get(&channel).is_some_and(|set| set.contains(&gifter)))
            .await
    }

    pub async fn ban(&self, broadcaster: &str, gifter: &str) -> bool {
        let channel = normalize_key(broadcaster);
        let gifter = normalize_key(gifter);
        self.map
            .mutate(|banned| banned.entry(channel).or_default().insert(gifter))
            .await
    }

    /// Lifts a ban. A channel left with no bans is dropped from the document.
    pub async fn unban(&self, broadcaster: &str, gifter: &str) -> bool {
        let channel = normalize_key(broadcaster);
        let gifter = normalize_key(gifter);
        self.map
            .mutate(|banned| {
                let Some(set) = banned.get_mut(&channel) else {
                    return false;
                };
                let removed = set.remove(&gifter);
                if set.is_empty() {
                    banned.remove(&channel);
                }
                removed
            })
            .await
    }

    pub async fn list(&self, broadcaster: &str) -> Vec<String> {
        let channel = normalize_key(broadcaster);
        self.map
            .read(|banned| {
                banned
                    .get(&channel)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::file::JsonFileStore;

    fn store(dir: &std::path::Path) -> Arc<dyn DocumentStore> {
        Arc::new(JsonFileStore::new(dir))
    }

    #[tokio::test]
    async fn theme_defaults_to_empty_and_ignores_case() {
        let dir = tempdir().unwrap();
        let themes = ThemeManager::open(store(dir.path())).unwrap();
        themes.load().await;

        assert_eq!(themes.get("Shroud").await, "");
        themes.set("Shroud", "  deep sea explorers ").await;
        assert_eq!(themes.get("SHROUD").await, "deep sea explorers");
        assert!(themes.remove("shroud").await);
        assert!(!themes.remove("shroud").await);
        assert_eq!(themes.get("shroud").await, "");
    }

    #[tokio::test]
    async fn meaning_falls_back_to_normalized_username() {
        let dir = tempdir().unwrap();
        let meanings = MeaningManager::open(store(dir.path())).unwrap();
        meanings.load().await;

        assert_eq!(meanings.get("NightOwl").await, "nightowl");
        assert_eq!(meanings.lookup("NightOwl").await, None);

        meanings.set("NightOwl", "an owl reading by lamplight").await;
        assert_eq!(meanings.get("nightowl").await, "an owl reading by lamplight");
    }

    #[tokio::test]
    async fn ignores_persist_as_a_flat_array() {
        let dir = tempdir().unwrap();
        {
            let ignores = IgnoreManager::open(store(dir.path())).unwrap();
            ignores.load().await;
            assert!(ignores.add("Shadow1").await);
            assert!(!ignores.add("shadow1").await);
            assert!(ignores.add("lurker").await);
        }

        let raw = std::fs::read_to_string(dir.path().join("ignores.json")).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["lurker".to_string(), "shadow1".to_string()]);

        let ignores = IgnoreManager::open(store(dir.path())).unwrap();
        ignores.load().await;
        assert!(ignores.is_ignored("SHADOW1").await);
        assert!(!ignores.is_ignored("someone").await);
        assert!(ignores.remove("Shadow1").await);
        assert_eq!(ignores.list().await, vec!["lurker".to_string()]);
    }

    #[tokio::test]
    async fn banned_gifters_are_per_channel() {
        let dir = tempdir().unwrap();
        let banned = BannedGifterManager::open(store(dir.path())).unwrap();
        banned.load().await;

        assert!(banned.ban("ChannelA", "Spammer").await);
        assert!(banned.is_banned("channela", "SPAMMER").await);
        assert!(!banned.is_banned("channelb", "spammer").await);
        assert_eq!(banned.list("CHANNELA").await, vec!["spammer".to_string()]);

        assert!(banned.unban("channela", "spammer").await);
        assert!(!banned.unban("channela", "spammer").await);
        assert!(banned.list("channela").await.is_empty());

        let raw = std::fs::read_to_string(dir.path().join("banned_gifters.json")).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let themes = ThemeManager::open(store(dir.path())).unwrap();
            themes.load().await;
            themes.set("shroud", "space pirates").await;
            let banned = BannedGifterManager::open(store(dir.path())).unwrap();
            banned.load().await;
            banned.ban("shroud", "troll").await;
        }

        let themes = ThemeManager::open(store(dir.path())).unwrap();
        themes.load().await;
        assert_eq!(themes.get("Shroud").await, "space pirates");

        let banned = BannedGifterManager::open(store(dir.path())).unwrap();
        banned.load().await;
        assert!(banned.is_banned("shroud", "Troll").await);
    }

    #[tokio::test]
    async fn removals_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let themes = ThemeManager::open(store(dir.path())).unwrap();
            let meanings = MeaningManager::open(store(dir.path())).unwrap();
            let ignores = IgnoreManager::open(store(dir.path())).unwrap();
            let banned = BannedGifterManager::open(store(dir.path())).unwrap();
            themes.load().await;
            meanings.load().await;
            ignores.load().await;
            banned.load().await;

            themes.set("shroud", "space pirates").await;
            meanings.set("NightOwl", "an owl reading by lamplight").await;
            ignores.add("shadow1").await;
            banned.ban("shroud", "troll").await;

            assert!(themes.remove("Shroud").await);
            assert!(meanings.remove("nightowl").await);
            assert!(ignores.remove("Shadow1").await);
            assert!(banned.unban("SHROUD", "Troll").await);
        }

        let themes = ThemeManager::open(store(dir.path())).unwrap();
        let meanings = MeaningManager::open(store(dir.path())).unwrap();
        let ignores = IgnoreManager::open(store(dir.path())).unwrap();
        let banned = BannedGifterManager::open(store(dir.path())).unwrap();
        themes.load().await;
        meanings.load().await;
        ignores.load().await;
        banned.load().await;

        assert_eq!(themes.get("shroud").await, "");
        assert_eq!(meanings.get("NightOwl").await, "nightowl");
        assert!(!ignores.is_ignored("shadow1").await);
        assert!(!banned.is_banned("shroud", "troll").await);
    }
}
