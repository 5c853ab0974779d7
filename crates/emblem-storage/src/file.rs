// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-file implementation of [`DocumentStore`].
//!
//! Each document is one `<name>.json` file in the data directory. Writes
//! replace the whole file: the new content goes to a sibling temp file which
//! is then renamed over the old one, so readers never see a half-written
//! document.
//!
//! **One owner per file.** Every state domain claims its document in a
//! process-wide registry keyed by path; a second claim on the same file is
//! rejected instead of letting two in-memory copies race on disk.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use async_trait::async_trait;
use emblem_core::{AdapterType, DocumentStore, EmblemError, PluginAdapter};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

static CLAIMED: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Stores documents as 4-space-indented JSON files under one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Stable whether or not the directory exists yet.
    fn claim_key(&self, name: &str) -> PathBuf {
        let path = self.path_for(name);
        std::path::absolute(&path).unwrap_or(path)
    }
}

/// Serializes with 4-space indentation.
pub fn to_pretty_json(value: &Value) -> Result<Vec<u8>, EmblemError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).map_err(EmblemError::storage)?;
    buf.push(b'\n');
    Ok(buf)
}

impl PluginAdapter for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read(&self, name: &str) -> Result<Option<Value>, EmblemError> {
        let path = self.path_for(name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document not found, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(EmblemError::storage(e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(EmblemError::storage)
    }

    async fn write(&self, name: &str, value: &Value) -> Result<(), EmblemError> {
        let bytes = to_pretty_json(value)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(EmblemError::storage)?;

        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".{name}.json.tmp"));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(EmblemError::storage)?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(EmblemError::storage)?;

        debug!(path = %path.display(), bytes = bytes.len(), "document written");
        Ok(())
    }

    fn claim(&self, name: &str) -> Result<(), EmblemError> {
        let key = self.claim_key(name);
        let mut claimed = CLAIMED
            .lock()
            .map_err(|_| EmblemError::Internal("document claim registry poisoned".into()))?;
        if !claimed.insert(key.clone()) {
            return Err(EmblemError::storage(format!(
                "{} is already owned by another store instance",
                key.display()
            )));
        }
        Ok(())
    }

    fn release(&self, name: &str) {
        let key = self.claim_key(name);
        if let Ok(mut claimed) = CLAIMED.lock() {
            claimed.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn missing_document_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.read("themes").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_round_trips_with_four_space_indent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let value = json!({"shadow1": "a moody raven"});

        store.write("meanings", &value).await.unwrap();

        let raw = std::fs::read_to_string(store.path_for("meanings")).unwrap();
        assert!(raw.contains("\n    \"shadow1\""), "got: {raw}");
        assert_eq!(store.read("meanings").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn malformed_document_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path_for("themes"), "{not json").unwrap();

        let err = store.read("themes").await.unwrap_err();
        assert!(matches!(err, EmblemError::Storage { .. }));
    }

    #[test]
    fn second_claim_on_same_file_is_rejected() {
        let dir = tempdir().unwrap();
        let first = JsonFileStore::new(dir.path());
        let second = JsonFileStore::new(dir.path());

        first.claim("ignores").unwrap();
        assert!(second.claim("ignores").is_err());
        assert!(second.claim("themes").is_ok());

        first.release("ignores");
        assert!(second.claim("ignores").is_ok());
    }
}
