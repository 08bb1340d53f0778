use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{DeckError, DeckResult};
use crate::references::index::{
    ReferenceFile, ReferenceIndex, SNAPSHOT_VERSION, build_index, diagnose_staleness,
    fingerprint_files, list_reference_files, structure_digest,
};
use crate::store::blob::{BlobStore, read_json, write_json};

/// Minimum number of reference images before indexing is attempted.
pub const DEFAULT_MIN_REFERENCES: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexStatus {
    /// Too few references; callers fall back to the builtin plan.
    NotRequired,
    /// Served from the in-process cache or a persisted snapshot.
    Reused,
    /// Recomputed from the files on disk.
    Rebuilt,
}

/// Outcome of [`ReferenceIndexCache::ensure`].
#[derive(Clone, Debug)]
pub struct ReferenceIndexContext {
    pub status: IndexStatus,
    pub root: PathBuf,
    pub structure_digest: String,
    pub reference_count: usize,
    pub index: Option<Arc<ReferenceIndex>>,
}

impl ReferenceIndexContext {
    /// Context used when no reference folder is configured.
    pub fn not_required(root: impl Into<PathBuf>) -> Self {
        Self {
            status: IndexStatus::NotRequired,
            root: root.into(),
            structure_digest: String::new(),
            reference_count: 0,
            index: None,
        }
    }

    pub fn reference_digest(&self) -> Option<&str> {
        self.index.as_deref().map(|i| i.reference_digest.as_str())
    }
}

/// Snapshot key in the blob store, addressed by structure digest.
pub fn snapshot_key(structure_digest: &str) -> String {
    format!("reference-index/{structure_digest}.json")
}

type Slot = Arc<Mutex<Option<Arc<ReferenceIndex>>>>;

/// Process-wide reference index cache, passed explicitly to callers.
///
/// Entries are keyed by `(root, structureDigest)`. Concurrent requests for the same key wait on a
/// per-key slot so only one of them rebuilds.
pub struct ReferenceIndexCache {
    store: Arc<dyn BlobStore>,
    min_references: usize,
    slots: Mutex<HashMap<(PathBuf, String), Slot>>,
}

impl std::fmt::Debug for ReferenceIndexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceIndexCache")
            .field("min_references", &self.min_references)
            .finish_non_exhaustive()
    }
}

fn poisoned() -> DeckError {
    DeckError::reference("reference cache lock poisoned")
}

impl ReferenceIndexCache {
    pub fn new(store: Arc<dyn BlobStore>, min_references: usize) -> Self {
        Self {
            store,
            min_references,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn min_references(&self) -> usize {
        self.min_references
    }

    /// Resolve a fresh index for `root`.
    ///
    /// A cached or persisted index is reused only when both its structure digest and the content
    /// digest of the files on disk still match; otherwise it is rebuilt. Slots for older digests of
    /// the same root are dropped.
    #[tracing::instrument(skip(self, root, pool), fields(root = %root.display()))]
    pub fn ensure(
        &self,
        root: &Path,
        pool: Option<&rayon::ThreadPool>,
    ) -> DeckResult<ReferenceIndexContext> {
        let files = list_reference_files(root)?;
        let digest = structure_digest(&files);
        if files.len() < self.min_references {
            tracing::info!(
                count = files.len(),
                min = self.min_references,
                "reference indexing not required"
            );
            return Ok(ReferenceIndexContext {
                status: IndexStatus::NotRequired,
                root: root.to_path_buf(),
                structure_digest: digest,
                reference_count: files.len(),
                index: None,
            });
        }

        let slot = {
            let mut slots = self.slots.lock().map_err(|_| poisoned())?;
            slots.retain(|(r, d), _| r.as_path() != root || *d == digest);
            slots
                .entry((root.to_path_buf(), digest.clone()))
                .or_default()
                .clone()
        };
        let mut guard = slot.lock().map_err(|_| poisoned())?;

        let candidate = match guard.as_ref() {
            Some(hit) => Some(hit.clone()),
            None => self.load_snapshot(&digest)?.map(Arc::new),
        };
        let reusable = match candidate {
            Some(index) => {
                let staleness = diagnose_staleness(&index, &files)?;
                if staleness.is_fresh() {
                    Some(index)
                } else {
                    tracing::warn!(
                        structure_changed = staleness.structure_changed,
                        content_changed = staleness.content_changed,
                        "reference index is stale"
                    );
                    None
                }
            }
            None => None,
        };

        let (index, status) = match reusable {
            Some(index) => {
                tracing::debug!("reference index reused");
                *guard = Some(index.clone());
                (index, IndexStatus::Reused)
            }
            None => {
                let built = self.rebuild(&files, &digest, pool)?;
                *guard = Some(built.clone());
                (built, IndexStatus::Rebuilt)
            }
        };

        Ok(ReferenceIndexContext {
            status,
            root: root.to_path_buf(),
            structure_digest: digest,
            reference_count: files.len(),
            index: Some(index),
        })
    }

    /// Drop cached and persisted state for `root` at `structure_digest`.
    pub fn invalidate(&self, root: &Path, structure_digest: &str) -> DeckResult<()> {
        self.slots
            .lock()
            .map_err(|_| poisoned())?
            .remove(&(root.to_path_buf(), structure_digest.to_string()));
        self.store.invalidate(&snapshot_key(structure_digest))
    }

    fn rebuild(
        &self,
        files: &[ReferenceFile],
        digest: &str,
        pool: Option<&rayon::ThreadPool>,
    ) -> DeckResult<Arc<ReferenceIndex>> {
        tracing::info!(count = files.len(), "rebuilding reference index");
        let refs = fingerprint_files(files, pool)?;
        let built = Arc::new(build_index(refs, digest)?);
        write_json(self.store.as_ref(), &snapshot_key(digest), built.as_ref())?;
        Ok(built)
    }

    fn load_snapshot(&self, digest: &str) -> DeckResult<Option<ReferenceIndex>> {
        let key = snapshot_key(digest);
        let snapshot: ReferenceIndex = match read_json(self.store.as_ref(), &key) {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable reference snapshot");
                return Ok(None);
            }
        };
        if snapshot.version != SNAPSHOT_VERSION || snapshot.structure_digest != digest {
            return Ok(None);
        }
        if let Err(err) = snapshot.check_partition() {
            tracing::warn!(error = %err, "discarding inconsistent reference snapshot");
            return Ok(None);
        }
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/references/cache.rs"]
mod tests;
