//! Durable storage for prediction entries.
//!
//! The orchestrator only ever needs per-key reads and per-key writes, so the
//! seam is a small trait any key-value backend can satisfy. Two backends
//! ship with the crate: a file-per-key JSON store and an in-memory store.

use crate::cache::entry::{CacheEntry, EntryPatch};
use crate::cache::error::StoreError;
use crate::cache::key::CacheKey;
use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tokio::{fs, task};

/// Backend contract for the prediction cache.
///
/// Implementations must provide atomic per-key reads and writes; the
/// orchestrator never needs multi-key transactions. Concurrent writers for
/// the same key may race, which the cache design tolerates as last-write-wins
/// (recomputation is deterministic given the same source data).
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Fetches the entry for a key, or `None` when no entry exists.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError>;

    /// Creates or replaces the entry for a key.
    async fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), StoreError>;

    /// Applies a partial update to an existing entry.
    ///
    /// Fails with [`StoreError::MissingEntry`] when the key has no entry.
    async fn update(&self, key: &CacheKey, patch: EntryPatch) -> Result<(), StoreError>;
}

/// File-backed store: one pretty-printed JSON document per key, named after
/// the key's canonical form, under a dedicated directory.
///
/// Writes go through a temporary file and an atomic rename, so readers never
/// observe a half-written entry.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    async fn write_atomic(&self, path: &Path, bytes: Vec<u8>) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Write(self.dir.clone(), e))?;

        let dir = self.dir.clone();
        let path = path.to_path_buf();
        task::spawn_blocking(move || {
            let mut temp_file =
                NamedTempFile::new_in(&dir).map_err(|e| StoreError::Write(path.clone(), e))?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| StoreError::Write(path.clone(), e))?;
            temp_file.flush().map_err(|e| StoreError::Write(path.clone(), e))?;
            temp_file
                .persist(&path)
                .map_err(|e| StoreError::Write(path, e.error))?;
            Ok::<(), StoreError>(())
        })
        .await?
    }
}

#[async_trait]
impl PredictionStore for FileStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read(path, e)),
        };
        let entry = serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode {
            key: key.to_string(),
            source: e,
        })?;
        Ok(Some(entry))
    }

    async fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), StoreError> {
        let path = self.entry_path(key);
        let bytes = serde_json::to_vec_pretty(entry).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            source: e,
        })?;
        self.write_atomic(&path, bytes).await?;
        info!("Persisted prediction entry {} to {:?}", key, path);
        Ok(())
    }

    async fn update(&self, key: &CacheKey, patch: EntryPatch) -> Result<(), StoreError> {
        let mut entry = self
            .get(key)
            .await?
            .ok_or_else(|| StoreError::MissingEntry(key.to_string()))?;
        patch.apply(&mut entry);
        self.put(key, &entry).await
    }
}

/// In-memory store, for tests and short-lived embeddings. Entries do not
/// survive the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), StoreError> {
        self.entries.write().await.insert(*key, entry.clone());
        Ok(())
    }

    async fn update(&self, key: &CacheKey, patch: EntryPatch) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| StoreError::MissingEntry(key.to_string()))?;
        patch.apply(entry);
        Ok(())
    }
}
