use std::io::Cursor;

use super::*;

fn png(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb(f(x, y)));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn sample_refs() -> Vec<FingerprintedReference> {
    let mut out = Vec::new();
    for i in 0..10u32 {
        let bytes = if i % 2 == 0 {
            png(64, 48, |_, _| [245, 245, 245])
        } else {
            png(64, 48, move |x, y| {
                if (x / 8 + y / 8 + i) % 2 == 0 { [200, 60, 40] } else { [20, 30, 120] }
            })
        };
        out.push(fingerprint_bytes(&format!("ref-{i:02}.png"), &bytes));
    }
    out.push(fingerprint_bytes("broken.png", b"not a png"));
    out
}

#[test]
fn clusters_partition_entries_and_medoids_are_members() {
    let index = build_index(sample_refs(), "structure").unwrap();
    index.check_partition().unwrap();
    assert_eq!(index.entries.len(), 11);
    for c in &index.style_clusters {
        assert_eq!(c.size, c.member_ids.len());
        assert!(c.member_ids.contains(&c.medoid_id));
    }
    for e in &index.entries {
        assert!(index.style_cluster(&e.style_cluster_id).is_some());
        assert!(index.layout_cluster(&e.layout_cluster_id).is_some());
    }
}

#[test]
fn clusters_are_ordered_by_size_then_key() {
    let index = build_index(sample_refs(), "structure").unwrap();
    for pair in index.style_clusters.windows(2) {
        assert!(
            pair[0].size > pair[1].size
                || (pair[0].size == pair[1].size && pair[0].key < pair[1].key)
        );
    }
    assert_eq!(index.style_clusters[0].id, "style-c01");
    assert_eq!(index.layout_clusters[0].id, "layout-c01");
}

#[test]
fn undecodable_reference_is_synthetic() {
    let index = build_index(sample_refs(), "structure").unwrap();
    let broken = index.entries.iter().find(|e| e.rel_path == "broken.png").unwrap();
    assert!(broken.synthetic);
    assert!(broken.id.starts_with("ref-"));
    assert_eq!(broken.id.len(), "ref-".len() + 12);
}

#[test]
fn index_is_independent_of_input_order() {
    let a = build_index(sample_refs(), "s").unwrap();
    let mut reversed = sample_refs();
    reversed.reverse();
    let b = build_index(reversed, "s").unwrap();
    assert_eq!(a, b);
}

#[test]
fn reference_digest_tracks_content_not_structure() {
    let a = build_index(sample_refs(), "one").unwrap();
    let b = build_index(sample_refs(), "two").unwrap();
    assert_eq!(a.reference_digest, b.reference_digest);
    assert_ne!(a.structure_digest, b.structure_digest);
}

#[test]
fn empty_reference_set_is_an_error() {
    assert!(build_index(Vec::new(), "s").is_err());
}

#[test]
fn structure_digest_changes_with_mtime() {
    let f = |mtime| ReferenceFile {
        rel_path: "a.png".into(),
        abs_path: "a.png".into(),
        size_bytes: 10,
        mtime_secs: mtime,
    };
    assert_ne!(structure_digest(&[f(1)]), structure_digest(&[f(2)]));
    assert_eq!(content_digest(&["b", "a"]), content_digest(&["a", "b"]));
}
