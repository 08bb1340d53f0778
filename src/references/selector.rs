use serde::{Deserialize, Serialize};

use crate::assets::scan::ScannedFont;
use crate::foundation::core::Rgb;
use crate::foundation::math::{centroid, euclidean, rotation_hash, step_hash};
use crate::references::archetype::{LayoutTuning, TokenHint};
use crate::references::index::ReferenceIndex;
use crate::style::tokens::{PRESETS, StylePreset, StyleTokens, builtin_tokens, derive_tokens};

pub const SAMPLE_MAX: usize = 16;
const PRESET_CANDIDATES: usize = 3;
const MAX_LAYOUT_CLUSTERS: usize = 4;

/// Where the style/layout plan came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    References,
    Builtin,
}

impl PlanSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::References => "references",
            Self::Builtin => "builtin",
        }
    }
}

/// One layout archetype chosen for the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedLayout {
    /// `None` for the builtin archetype.
    pub cluster_id: Option<String>,
    pub tuning: LayoutTuning,
}

/// Style tokens plus rotating layout archetypes for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleLayoutSelection {
    pub source: PlanSource,
    pub tokens: StyleTokens,
    pub preset_candidates: Vec<String>,
    pub style_cluster_id: Option<String>,
    pub sample_ids: Vec<String>,
    pub layouts: Vec<SelectedLayout>,
    pub variant_index: u32,
    pub reference_digest: Option<String>,
}

impl StyleLayoutSelection {
    /// Archetype for a 0-based page index: `layouts[(pageIndex + variantIndex - 1) mod N]`.
    pub fn layout_for_page(&self, page_index: usize) -> SelectedLayout {
        let n = self.layouts.len();
        if n == 0 {
            return SelectedLayout {
                cluster_id: None,
                tuning: LayoutTuning::balanced(),
            };
        }
        let pos = (page_index as i64 + i64::from(self.variant_index) - 1).rem_euclid(n as i64);
        self.layouts[pos as usize].clone()
    }
}

/// Layout cluster target: 3 for six or more pages, 2 for more than one, else 1.
pub fn layout_cluster_target(page_count: usize) -> usize {
    if page_count >= 6 {
        3
    } else if page_count > 1 {
        2
    } else {
        1
    }
}

/// Representative sample: medoids by cluster size, then round-robin over remaining members.
pub fn representative_sample(index: &ReferenceIndex) -> Vec<String> {
    let target = index.entries.len().min(SAMPLE_MAX);
    let mut out: Vec<String> = Vec::with_capacity(target);
    for c in &index.style_clusters {
        if out.len() >= target {
            break;
        }
        out.push(c.medoid_id.clone());
    }
    let mut round = 0usize;
    let longest = index
        .style_clusters
        .iter()
        .map(|c| c.member_ids.len())
        .max()
        .unwrap_or(0);
    while out.len() < target && round < longest {
        for c in &index.style_clusters {
            if out.len() >= target {
                break;
            }
            let rest: Vec<&String> = c.member_ids.iter().filter(|m| **m != c.medoid_id).collect();
            if let Some(m) = rest.get(round) {
                out.push((*m).clone());
            }
        }
        round += 1;
    }
    out
}

/// Presets ranked by negative distance to `target`, ties by id.
pub fn rank_presets(target: &[f64]) -> Vec<&'static StylePreset> {
    let mut scored: Vec<(f64, &'static StylePreset)> = PRESETS
        .iter()
        .map(|p| (-euclidean(&p.vector(), target), p))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.id.cmp(b.1.id)));
    scored.into_iter().map(|(_, p)| p).collect()
}

/// Deterministic rotating walk choosing `n` distinct positions out of `len`.
pub(crate) fn rotating_walk(len: usize, n: usize, start: usize, step: usize) -> Vec<usize> {
    let n = n.min(len);
    let mut chosen = Vec::with_capacity(n);
    if len == 0 {
        return chosen;
    }
    let step = step.max(1);
    let mut idx = start % len;
    let mut guard = 0usize;
    while chosen.len() < n && guard < len * (len + 1) {
        if chosen.contains(&idx) {
            idx = (idx + 1) % len;
        } else {
            chosen.push(idx);
            idx = (idx + step) % len;
        }
        guard += 1;
    }
    chosen
}

/// Select tokens and layouts from a fresh reference index.
#[tracing::instrument(skip(index, fonts), fields(digest = %index.reference_digest))]
pub fn select_from_references(
    index: &ReferenceIndex,
    fonts: &[ScannedFont],
    seed: u64,
    variant_index: u32,
    page_count: usize,
) -> StyleLayoutSelection {
    let digest = index.reference_digest.as_str();
    let rot = rotation_hash(seed, variant_index, digest);

    let sample_ids = representative_sample(index);
    let vectors: Vec<Vec<f64>> = sample_ids
        .iter()
        .filter_map(|id| index.entry(id))
        .map(|e| e.style_fingerprint.vector())
        .collect();
    let target = centroid(&vectors);

    let ranked = rank_presets(&target);
    let candidates: Vec<&StylePreset> = ranked.into_iter().take(PRESET_CANDIDATES).collect();
    let preset = candidates[(rot % candidates.len() as u64) as usize];

    let style_span = index.style_clusters.len().min(PRESET_CANDIDATES).max(1);
    let style_cluster = index
        .style_clusters
        .get(((rot >> 8) % style_span as u64) as usize);
    let (palette, hint): (Vec<Rgb>, TokenHint) = match style_cluster {
        Some(c) => (
            index
                .entry(&c.medoid_id)
                .map(|e| e.palette.to_vec())
                .unwrap_or_default(),
            c.token_hint,
        ),
        None => (Vec::new(), TokenHint::default()),
    };
    let tokens = derive_tokens(preset, &palette, &hint, fonts);

    let len = index.layout_clusters.len();
    let n = layout_cluster_target(page_count)
        .min(MAX_LAYOUT_CLUSTERS)
        .min(len);
    let start = if len == 0 { 0 } else { (rot % len as u64) as usize };
    let step = if len == 0 {
        1
    } else {
        (step_hash(digest, variant_index) % len as u64) as usize
    };
    let layouts = rotating_walk(len, n, start, step)
        .into_iter()
        .map(|i| {
            let c = &index.layout_clusters[i];
            SelectedLayout {
                cluster_id: Some(c.id.clone()),
                tuning: c.archetype,
            }
        })
        .collect();

    tracing::debug!(preset = preset.id, "style preset selected");
    StyleLayoutSelection {
        source: PlanSource::References,
        tokens,
        preset_candidates: candidates.iter().map(|p| p.id.to_string()).collect(),
        style_cluster_id: style_cluster.map(|c| c.id.clone()),
        sample_ids,
        layouts,
        variant_index,
        reference_digest: Some(index.reference_digest.clone()),
    }
}

/// Builtin plan: default preset and one balanced archetype on every page.
pub fn select_builtin(fonts: &[ScannedFont], variant_index: u32) -> StyleLayoutSelection {
    let tokens = builtin_tokens(fonts);
    StyleLayoutSelection {
        source: PlanSource::Builtin,
        preset_candidates: vec![tokens.preset_id.clone()],
        tokens,
        style_cluster_id: None,
        sample_ids: Vec::new(),
        layouts: vec![SelectedLayout {
            cluster_id: None,
            tuning: LayoutTuning::balanced(),
        }],
        variant_index,
        reference_digest: None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/references/selector.rs"]
mod tests;
