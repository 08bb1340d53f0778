use std::collections::BTreeSet;

use super::*;
use crate::references::fingerprint::synthetic_fingerprint;
use crate::references::index::{FingerprintedReference, build_index};

fn synthetic_index(n: usize) -> ReferenceIndex {
    let refs = (0..n)
        .map(|i| {
            let hash = crate::foundation::digest::sha256_hex(format!("ref{i}").as_bytes());
            FingerprintedReference {
                rel_path: format!("r{i:02}.png"),
                fingerprint: synthetic_fingerprint(&hash),
                content_hash: hash,
            }
        })
        .collect();
    build_index(refs, "structure").unwrap()
}

#[test]
fn sample_is_capped_and_starts_with_medoids() {
    let index = synthetic_index(24);
    let sample = representative_sample(&index);
    assert_eq!(sample.len(), SAMPLE_MAX);
    let unique: BTreeSet<&String> = sample.iter().collect();
    assert_eq!(unique.len(), sample.len());
    let medoids = index.style_clusters.len().min(SAMPLE_MAX);
    for (i, c) in index.style_clusters.iter().take(medoids).enumerate() {
        assert_eq!(sample[i], c.medoid_id);
    }
}

#[test]
fn rotating_walk_returns_unique_positions() {
    assert_eq!(rotating_walk(5, 3, 1, 2), vec![1, 3, 0]);
    // A step sharing a factor with the length still terminates with unique picks.
    let picks = rotating_walk(4, 4, 0, 2);
    let unique: BTreeSet<usize> = picks.iter().copied().collect();
    assert_eq!(unique.len(), 4);
    assert!(rotating_walk(0, 3, 0, 1).is_empty());
    assert_eq!(rotating_walk(2, 3, 0, 1).len(), 2);
}

#[test]
fn layout_count_follows_page_count() {
    let index = synthetic_index(16);
    let available = index.layout_clusters.len();
    for (pages, want) in [(1, 1), (4, 2), (8, 3)] {
        let sel = select_from_references(&index, &[], 7, 0, pages);
        assert_eq!(sel.layouts.len(), want.min(available));
        assert_eq!(sel.source, PlanSource::References);
    }
}

#[test]
fn selection_is_deterministic_and_uses_top_candidates() {
    let index = synthetic_index(12);
    let a = select_from_references(&index, &[], 42, 1, 8);
    let b = select_from_references(&index, &[], 42, 1, 8);
    assert_eq!(a, b);
    assert_eq!(a.preset_candidates.len(), 3);
    assert!(a.preset_candidates.contains(&a.tokens.preset_id));
    assert!(a.style_cluster_id.is_some());
}

#[test]
fn page_rotation_wraps_with_variant_offset() {
    let mut sel = select_builtin(&[], 2);
    sel.layouts = (0..3)
        .map(|i| SelectedLayout {
            cluster_id: Some(format!("layout-c{i:02}")),
            tuning: LayoutTuning::balanced(),
        })
        .collect();
    // (0 + 2 - 1) mod 3 = 1
    assert_eq!(sel.layout_for_page(0).cluster_id.as_deref(), Some("layout-c01"));
    assert_eq!(sel.layout_for_page(2).cluster_id.as_deref(), Some("layout-c00"));
    sel.variant_index = 0;
    assert_eq!(sel.layout_for_page(0).cluster_id.as_deref(), Some("layout-c02"));
}

#[test]
fn builtin_has_single_balanced_archetype() {
    let sel = select_builtin(&[], 0);
    assert_eq!(sel.source, PlanSource::Builtin);
    assert_eq!(sel.layouts.len(), 1);
    assert_eq!(sel.layout_for_page(5).tuning, LayoutTuning::balanced());
    assert!(sel.reference_digest.is_none());
}
