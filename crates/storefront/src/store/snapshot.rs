//! Local snapshot storage: a durable string map for data that never leaves the device
//! (address book, order history).
//!
//! Keys are scoped per shopper as `<user id>/<name>`, see [`SnapshotKey`].

use crate::model::UserId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The fixed snapshot names the storefront uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKey {
    Addresses,
    Orders,
    /// Single address remembered by checkout before the address book existed.
    LegacyAddress,
}

impl SnapshotKey {
    pub fn name(self) -> &'static str {
        match self {
            SnapshotKey::Addresses => "userAddresses",
            SnapshotKey::Orders => "userOrders",
            SnapshotKey::LegacyAddress => "userAddress",
        }
    }

    pub fn for_user(self, user: &UserId) -> String {
        format!("{}/{}", user, self.name())
    }
}

/// Pluggable persistence: get/set/delete plus a feed of changed keys.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SnapshotError>;
    async fn set(&self, key: &str, value: String) -> Result<(), SnapshotError>;
    async fn delete(&self, key: &str) -> Result<(), SnapshotError>;
    /// Keys written or deleted from now on.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// Reads and decodes a JSON snapshot. A missing key is `Ok(None)`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<Option<T>, SnapshotError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SnapshotError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub async fn save_json<T: Serialize + Sync>(
    store: &dyn SnapshotStore,
    key: &str,
    value: &T,
) -> Result<(), SnapshotError> {
    let raw = serde_json::to_string(value).map_err(|source| SnapshotError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, raw).await
}

/// Copies an unreadable snapshot to `<key>.corrupt` and returns the backup key.
///
/// Callers that start over from empty do this first, so their next write can't destroy the
/// only copy of what was stored.
pub async fn quarantine(store: &dyn SnapshotStore, key: &str) -> Result<String, SnapshotError> {
    let backup = format!("{key}.corrupt");
    if let Some(raw) = store.get(key).await? {
        store.set(&backup, raw).await?;
    }
    Ok(backup)
}

const CHANGE_FEED_CAPACITY: usize = 64;

// -----------------------------------------------------------------------------
// In-memory
// -----------------------------------------------------------------------------

pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<String>,
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SnapshotError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SnapshotError> {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            let _ = self.changes.send(key.to_string());
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

// -----------------------------------------------------------------------------
// JSON files
// -----------------------------------------------------------------------------

/// One JSON file per key under a root directory: `user_1/userOrders` is stored at
/// `<root>/user_1/userOrders.json`.
///
/// Key segments are percent-encoded so arbitrary user ids can't escape the root.
pub struct FileSnapshotStore {
    root: PathBuf,
    changes: broadcast::Sender<String>,
}

impl FileSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            root: root.into(),
            changes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        let segments: Vec<String> = key.split('/').map(encode_segment).collect();
        if let Some((file, dirs)) = segments.split_last() {
            for dir in dirs {
                path.push(dir);
            }
            path.push(format!("{file}.json"));
        }
        path
    }

    fn io_error(key: &str, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            key: key.to_string(),
            source,
        }
    }
}

fn encode_segment(segment: &str) -> String {
    if segment.is_empty() {
        return "%00".to_string();
    }
    // urlencoding keeps '.', so "." and ".." would still resolve
    urlencoding::encode(segment).replace('.', "%2E")
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SnapshotError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(key, e))?;
        }
        // Write-then-rename so a crash never leaves a half-written snapshot
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| Self::io_error(key, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Self::io_error(key, e))?;
        debug!(key, path = %path.display(), "Snapshot written");
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SnapshotError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                let _ = self.changes.send(key.to_string());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}
