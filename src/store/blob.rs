use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::assets::scan::normalize_rel_path;
use crate::foundation::error::{DeckError, DeckResult};

/// Key -> blob persistence contract for snapshots and job artifacts.
///
/// Keys are `/`-separated relative paths (for example `jobs/<hash>/layout.json`). Implementations
/// must be safe to share between threads.
pub trait BlobStore: Send + Sync {
    /// Read a blob; `Ok(None)` when the key is absent.
    fn read(&self, key: &str) -> DeckResult<Option<Vec<u8>>>;
    /// Write (or replace) a blob.
    fn write(&self, key: &str, bytes: &[u8]) -> DeckResult<()>;
    /// Drop a blob if present.
    fn invalidate(&self, key: &str) -> DeckResult<()>;
}

/// In-memory store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        self.blobs
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn poisoned() -> DeckError {
    DeckError::serde("blob store lock poisoned")
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> DeckResult<Option<Vec<u8>>> {
        let key = normalize_rel_path(key)?;
        Ok(self.blobs.lock().map_err(|_| poisoned())?.get(&key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> DeckResult<()> {
        let key = normalize_rel_path(key)?;
        self.blobs
            .lock()
            .map_err(|_| poisoned())?
            .insert(key, bytes.to_vec());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> DeckResult<()> {
        let key = normalize_rel_path(key)?;
        self.blobs.lock().map_err(|_| poisoned())?.remove(&key);
        Ok(())
    }
}

/// Store that never retains anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopBlobStore;

impl BlobStore for NoopBlobStore {
    fn read(&self, _key: &str) -> DeckResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn write(&self, _key: &str, _bytes: &[u8]) -> DeckResult<()> {
        Ok(())
    }

    fn invalidate(&self, _key: &str) -> DeckResult<()> {
        Ok(())
    }
}

/// Filesystem store rooted at a directory.
#[derive(Clone, Debug)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> DeckResult<PathBuf> {
        let key = normalize_rel_path(key)?;
        Ok(self.root.join(key))
    }
}

impl BlobStore for DirBlobStore {
    fn read(&self, key: &str) -> DeckResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).with_context(|| format!("read '{}'", path.display()))?;
        Ok(Some(bytes))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> DeckResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory '{}'", parent.display()))?;
        }
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }

    fn invalidate(&self, key: &str) -> DeckResult<()> {
        let path = self.path_for(key)?;
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("remove '{}'", path.display()))?;
        }
        Ok(())
    }
}

/// Serialize `value` as pretty JSON into `store`.
pub fn write_json<T: serde::Serialize>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
) -> DeckResult<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| DeckError::serde(format!("serialize '{key}': {e}")))?;
    store.write(key, &bytes)
}

/// Read and parse a JSON blob; `Ok(None)` when absent.
pub fn read_json<T: serde::de::DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> DeckResult<Option<T>> {
    let Some(bytes) = store.read(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| DeckError::serde(format!("parse '{key}': {e}")))?;
    Ok(Some(value))
}

#[cfg(test)]
#[path = "../../tests/unit/store/blob.rs"]
mod tests;
