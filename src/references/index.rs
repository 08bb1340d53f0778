use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_samples;
use crate::assets::scan::{IMAGE_EXTENSIONS, list_files, stable_file_id};
use crate::foundation::digest::{sha256_hex, sha256_parts};
use crate::foundation::error::{DeckError, DeckResult};
use crate::foundation::math::{centroid, euclidean};
use crate::references::archetype::{LayoutTuning, TokenHint};
use crate::references::fingerprint::{
    ImageFingerprint, LayoutFingerprint, Palette, StyleFingerprint, fingerprint_samples,
    synthetic_fingerprint,
};

/// Snapshot schema version; bumping it invalidates persisted snapshots.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One reference file discovered on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub size_bytes: u64,
    /// Modification time in whole seconds since the Unix epoch (0 when unavailable).
    pub mtime_secs: u64,
}

/// List reference images under `root`, sorted by relative path.
pub fn list_reference_files(root: &Path) -> DeckResult<Vec<ReferenceFile>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    list_files(root, &IMAGE_EXTENSIONS)?
        .into_iter()
        .map(|(rel_path, abs_path)| {
            let meta = std::fs::metadata(&abs_path)
                .with_context(|| format!("stat reference '{}'", abs_path.display()))?;
            let mtime_secs = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0);
            Ok(ReferenceFile {
                rel_path,
                abs_path,
                size_bytes: meta.len(),
                mtime_secs,
            })
        })
        .collect()
}

/// Digest over `(relPath, sizeBytes, mtime)` of every file; the primary rebuild key.
pub fn structure_digest(files: &[ReferenceFile]) -> String {
    let lines: Vec<String> = files
        .iter()
        .map(|f| format!("{}|{}|{}", f.rel_path, f.size_bytes, f.mtime_secs))
        .collect();
    sha256_parts(&lines)
}

/// Hash of sorted per-file content hashes.
pub fn content_digest<S: AsRef<str>>(content_hashes: &[S]) -> String {
    let mut sorted: Vec<&str> = content_hashes.iter().map(|s| s.as_ref()).collect();
    sorted.sort_unstable();
    sha256_parts(&sorted)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceIndexEntry {
    pub id: String,
    pub rel_path: String,
    pub width_px: u32,
    pub height_px: u32,
    pub aspect: f64,
    pub palette: Palette,
    pub density: f64,
    pub whitespace_ratio: f64,
    pub style_fingerprint: StyleFingerprint,
    pub layout_fingerprint: LayoutFingerprint,
    pub style_cluster_id: String,
    pub layout_cluster_id: String,
    pub content_hash: String,
    #[serde(default)]
    pub synthetic: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceStyleCluster {
    pub id: String,
    pub key: String,
    pub size: usize,
    pub medoid_id: String,
    pub member_ids: Vec<String>,
    pub token_hint: TokenHint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLayoutCluster {
    pub id: String,
    pub key: String,
    pub size: usize,
    pub medoid_id: String,
    pub member_ids: Vec<String>,
    pub archetype: LayoutTuning,
}

/// Versioned, content-addressed snapshot of the reference taxonomy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceIndex {
    pub version: u32,
    pub structure_digest: String,
    pub content_digest: String,
    pub file_id_digest: String,
    pub reference_digest: String,
    pub entries: Vec<ReferenceIndexEntry>,
    pub style_clusters: Vec<ReferenceStyleCluster>,
    pub layout_clusters: Vec<ReferenceLayoutCluster>,
}

impl ReferenceIndex {
    pub fn entry(&self, id: &str) -> Option<&ReferenceIndexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn style_cluster(&self, id: &str) -> Option<&ReferenceStyleCluster> {
        self.style_clusters.iter().find(|c| c.id == id)
    }

    pub fn layout_cluster(&self, id: &str) -> Option<&ReferenceLayoutCluster> {
        self.layout_clusters.iter().find(|c| c.id == id)
    }

    /// Check that both cluster kinds partition the entries and every medoid is a member.
    pub fn check_partition(&self) -> DeckResult<()> {
        let ids: BTreeSet<&str> = self.entries.iter().map(|e| e.id.as_str()).collect();
        if ids.len() != self.entries.len() {
            return Err(DeckError::reference("duplicate reference entry ids"));
        }

        let check = |kind: &str, clusters: Vec<(&str, &str, &[String])>| -> DeckResult<()> {
            let mut seen = BTreeSet::new();
            for (cid, medoid, members) in clusters {
                if !members.iter().any(|m| m == medoid) {
                    return Err(DeckError::reference(format!(
                        "{kind} cluster '{cid}' medoid is not a member"
                    )));
                }
                for m in members {
                    if !ids.contains(m.as_str()) || !seen.insert(m.as_str()) {
                        return Err(DeckError::reference(format!(
                            "{kind} cluster '{cid}' breaks the partition at '{m}'"
                        )));
                    }
                }
            }
            if seen.len() != ids.len() {
                return Err(DeckError::reference(format!(
                    "{kind} clusters do not cover every entry"
                )));
            }
            Ok(())
        };

        check(
            "style",
            self.style_clusters
                .iter()
                .map(|c| (c.id.as_str(), c.medoid_id.as_str(), c.member_ids.as_slice()))
                .collect(),
        )?;
        check(
            "layout",
            self.layout_clusters
                .iter()
                .map(|c| (c.id.as_str(), c.medoid_id.as_str(), c.member_ids.as_slice()))
                .collect(),
        )?;

        for e in &self.entries {
            if e.style_cluster_id.is_empty() || e.layout_cluster_id.is_empty() {
                return Err(DeckError::reference(format!(
                    "entry '{}' has no cluster assignment",
                    e.id
                )));
            }
        }
        Ok(())
    }
}

/// Fingerprinted input to clustering.
#[derive(Clone, Debug)]
pub struct FingerprintedReference {
    pub rel_path: String,
    pub content_hash: String,
    pub fingerprint: ImageFingerprint,
}

/// Decode and fingerprint one reference, falling back to a synthetic fingerprint.
pub fn fingerprint_bytes(rel_path: &str, bytes: &[u8]) -> FingerprintedReference {
    let content_hash = sha256_hex(bytes);
    let fingerprint = match decode_samples(bytes) {
        Ok(grid) => fingerprint_samples(&grid),
        Err(err) => {
            tracing::warn!(file = %rel_path, error = %err, "reference decode failed; using synthetic fingerprint");
            synthetic_fingerprint(&content_hash)
        }
    };
    FingerprintedReference {
        rel_path: rel_path.to_string(),
        content_hash,
        fingerprint,
    }
}

/// Read and fingerprint files, in parallel when a pool is supplied. Output keeps input order.
pub fn fingerprint_files(
    files: &[ReferenceFile],
    pool: Option<&rayon::ThreadPool>,
) -> DeckResult<Vec<FingerprintedReference>> {
    let one = |f: &ReferenceFile| -> DeckResult<FingerprintedReference> {
        let bytes = std::fs::read(&f.abs_path)
            .with_context(|| format!("read reference '{}'", f.abs_path.display()))?;
        Ok(fingerprint_bytes(&f.rel_path, &bytes))
    };
    match pool {
        Some(pool) => pool.install(|| files.par_iter().map(one).collect()),
        None => files.iter().map(one).collect(),
    }
}

struct Grouped {
    key: String,
    members: Vec<usize>,
    medoid: usize,
}

/// Bucket by key, sort by size desc then key, pick the member nearest the centroid.
fn group_by_key(ids: &[String], keys: &[String], vectors: &[Vec<f64>]) -> Vec<Grouped> {
    let mut buckets: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        buckets.entry(k.as_str()).or_default().push(i);
    }

    let mut groups: Vec<Grouped> = buckets
        .into_iter()
        .map(|(key, members)| {
            let member_vectors: Vec<Vec<f64>> =
                members.iter().map(|&i| vectors[i].clone()).collect();
            let c = centroid(&member_vectors);
            let mut medoid = members[0];
            let mut best = f64::INFINITY;
            for &i in &members {
                let d = euclidean(&vectors[i], &c);
                if d < best - 1e-12 || ((d - best).abs() <= 1e-12 && ids[i] < ids[medoid]) {
                    best = d;
                    medoid = i;
                }
            }
            Grouped {
                key: key.to_string(),
                members,
                medoid,
            }
        })
        .collect();
    groups.sort_by(|a, b| b.members.len().cmp(&a.members.len()).then(a.key.cmp(&b.key)));
    groups
}

/// Cluster fingerprinted references into a snapshot. Pure; no IO.
pub fn build_index(
    mut refs: Vec<FingerprintedReference>,
    structure_digest: &str,
) -> DeckResult<ReferenceIndex> {
    if refs.is_empty() {
        return Err(DeckError::reference("cannot index an empty reference set"));
    }
    refs.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    let ids: Vec<String> = refs
        .iter()
        .map(|r| stable_file_id("ref", &r.rel_path))
        .collect();
    let content_hashes: Vec<&str> = refs.iter().map(|r| r.content_hash.as_str()).collect();
    let content_digest = content_digest(&content_hashes);
    let file_id_digest = sha256_parts(&ids);
    let reference_digest = sha256_parts(&[
        format!("v{SNAPSHOT_VERSION}"),
        content_digest.clone(),
        file_id_digest.clone(),
    ]);

    let style_keys: Vec<String> = refs
        .iter()
        .map(|r| r.fingerprint.style.bucket_key())
        .collect();
    let style_vectors: Vec<Vec<f64>> = refs.iter().map(|r| r.fingerprint.style.vector()).collect();
    let layout_keys: Vec<String> = refs
        .iter()
        .map(|r| r.fingerprint.layout.bucket_key())
        .collect();
    let layout_vectors: Vec<Vec<f64>> =
        refs.iter().map(|r| r.fingerprint.layout.vector()).collect();

    let mut style_of = vec![String::new(); refs.len()];
    let style_clusters: Vec<ReferenceStyleCluster> =
        group_by_key(&ids, &style_keys, &style_vectors)
            .into_iter()
            .enumerate()
            .map(|(n, g)| {
                let id = format!("style-c{:02}", n + 1);
                for &m in &g.members {
                    style_of[m] = id.clone();
                }
                ReferenceStyleCluster {
                    id,
                    key: g.key,
                    size: g.members.len(),
                    medoid_id: ids[g.medoid].clone(),
                    member_ids: g.members.iter().map(|&m| ids[m].clone()).collect(),
                    token_hint: refs[g.medoid].fingerprint.style.token_hint(),
                }
            })
            .collect();

    let mut layout_of = vec![String::new(); refs.len()];
    let layout_clusters: Vec<ReferenceLayoutCluster> =
        group_by_key(&ids, &layout_keys, &layout_vectors)
            .into_iter()
            .enumerate()
            .map(|(n, g)| {
                let id = format!("layout-c{:02}", n + 1);
                for &m in &g.members {
                    layout_of[m] = id.clone();
                }
                ReferenceLayoutCluster {
                    id,
                    key: g.key,
                    size: g.members.len(),
                    medoid_id: ids[g.medoid].clone(),
                    member_ids: g.members.iter().map(|&m| ids[m].clone()).collect(),
                    archetype: refs[g.medoid].fingerprint.layout.tuning(),
                }
            })
            .collect();

    let entries = refs
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let fp = r.fingerprint;
            let aspect = if fp.height_px > 0 {
                f64::from(fp.width_px) / f64::from(fp.height_px)
            } else {
                1.0
            };
            ReferenceIndexEntry {
                id: ids[i].clone(),
                rel_path: r.rel_path,
                width_px: fp.width_px,
                height_px: fp.height_px,
                aspect,
                palette: fp.palette,
                density: fp.style.density,
                whitespace_ratio: fp.style.whitespace_ratio,
                style_fingerprint: fp.style,
                layout_fingerprint: fp.layout,
                style_cluster_id: std::mem::take(&mut style_of[i]),
                layout_cluster_id: std::mem::take(&mut layout_of[i]),
                content_hash: r.content_hash,
                synthetic: fp.synthetic,
            }
        })
        .collect();

    let index = ReferenceIndex {
        version: SNAPSHOT_VERSION,
        structure_digest: structure_digest.to_string(),
        content_digest,
        file_id_digest,
        reference_digest,
        entries,
        style_clusters,
        layout_clusters,
    };
    index.check_partition()?;
    Ok(index)
}

/// Staleness diagnosis for a snapshot against the files currently on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staleness {
    pub structure_changed: bool,
    pub content_changed: bool,
}

impl Staleness {
    pub fn is_fresh(&self) -> bool {
        !self.structure_changed && !self.content_changed
    }
}

/// Compare `index` with the files on disk. Reads every file to recompute the content digest.
pub fn diagnose_staleness(index: &ReferenceIndex, files: &[ReferenceFile]) -> DeckResult<Staleness> {
    let mut hashes = Vec::with_capacity(files.len());
    for f in files {
        let bytes = std::fs::read(&f.abs_path)
            .with_context(|| format!("read reference '{}'", f.abs_path.display()))?;
        hashes.push(sha256_hex(&bytes));
    }
    Ok(Staleness {
        structure_changed: structure_digest(files) != index.structure_digest,
        content_changed: content_digest(&hashes) != index.content_digest,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/references/index.rs"]
mod tests;
