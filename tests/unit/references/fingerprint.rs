use super::*;

fn grid_from(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> SampleGrid {
    let mut samples = Vec::new();
    for y in 0..h {
        for x in 0..w {
            samples.push(f(x, y));
        }
    }
    SampleGrid {
        width_px: w,
        height_px: h,
        stride: 1,
        cols: w,
        rows: h,
        samples,
    }
}

#[test]
fn blank_page_is_airy_and_empty() {
    let fp = fingerprint_samples(&grid_from(60, 40, |_, _| [250, 250, 250]));
    assert!(!fp.synthetic);
    assert_eq!(fp.style.density, 0.0);
    assert_eq!(fp.style.whitespace_ratio, 1.0);
    assert_eq!(fp.layout.rhythm, Rhythm::Airy);
    assert_eq!(fp.layout.column_guess, 1);
    assert_eq!(fp.palette.len(), 1);
}

#[test]
fn two_dark_columns_are_detected() {
    let fp = fingerprint_samples(&grid_from(100, 60, |x, y| {
        let in_col = (10..40).contains(&x) || (60..90).contains(&x);
        if in_col && (10..50).contains(&y) {
            [30, 30, 40]
        } else {
            [255, 255, 255]
        }
    }));
    assert_eq!(fp.layout.column_guess, 2);
    assert!(fp.style.density > 0.3);
    assert!(fp.layout.body_occupancy > fp.layout.header_occupancy);
}

#[test]
fn top_heavy_image_has_high_hero_ratio() {
    let fp = fingerprint_samples(&grid_from(50, 50, |_, y| {
        if (2..22).contains(&y) { [200, 40, 40] } else { [255, 255, 255] }
    }));
    assert!(fp.layout.hero_ratio > 0.9);
    assert!(fp.style.temperature > 0.5);
}

#[test]
fn fingerprint_values_are_bounded() {
    let fp = fingerprint_samples(&grid_from(37, 23, |x, y| {
        [((x * 37) % 256) as u8, ((y * 91) % 256) as u8, ((x * y) % 256) as u8]
    }));
    for v in fp.style.vector().into_iter().chain(fp.layout.vector()) {
        assert!((0.0..=1.0).contains(&v), "value out of range: {v}");
    }
    assert!(fp.palette.len() <= PALETTE_MAX);
}

#[test]
fn synthetic_fallback_is_seeded_and_flagged() {
    let a = synthetic_fingerprint("00ff00ff00ff00ff1234");
    let b = synthetic_fingerprint("00ff00ff00ff00ff1234");
    let c = synthetic_fingerprint("abcdefabcdefabcd0000");
    assert!(a.synthetic);
    assert_eq!(a, b);
    assert_ne!(a.style, c.style);
    assert!((1..=4).contains(&a.layout.column_guess));
}

#[test]
fn bucket_keys_encode_bins() {
    let fp = fingerprint_samples(&grid_from(20, 20, |_, _| [250, 250, 250]));
    assert_eq!(fp.style.bucket_key(), "neutral-l2-s0-d0-round");
    assert!(fp.layout.bucket_key().starts_with("c1-"));
}
