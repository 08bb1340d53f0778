use super::*;

#[test]
fn overlap_area_ignores_touching_edges() {
    let a = BoxMm::new(0.0, 0.0, 10.0, 10.0);
    let b = BoxMm::new(10.0, 0.0, 10.0, 10.0);
    assert_eq!(a.overlap_area(&b), 0.0);
    let c = BoxMm::new(5.0, 5.0, 10.0, 10.0);
    assert!((a.overlap_area(&c) - 25.0).abs() < 1e-9);
}

#[test]
fn inset_never_goes_negative() {
    let b = BoxMm::new(0.0, 0.0, 4.0, 2.0).inset(5.0);
    assert!(b.w_mm >= 0.0 && b.h_mm >= 0.0);
}

#[test]
fn page_size_rejects_non_positive() {
    assert!(PageSizeMm::new(0.0, 10.0).is_err());
    assert!(PageSizeMm::new(210.0, f64::NAN).is_err());
    assert!(PageSizeMm::new(210.0, 297.0).is_ok());
}

#[test]
fn hex_roundtrip_and_rejects_garbage() {
    let c = Rgb::from_hex("#1a2B3c").unwrap();
    assert_eq!(c, Rgb::new(0x1a, 0x2b, 0x3c));
    assert_eq!(c.to_hex(), "#1a2b3c");
    assert!(Rgb::from_hex("#12345").is_err());
    assert!(Rgb::from_hex("zzzzzz").is_err());
}

#[test]
fn luma_guards_move_toward_bounds() {
    let dark = Rgb::new(30, 30, 60);
    let lifted = ensure_min_luma(dark, 0.6);
    assert!(lifted.luma() > dark.luma());

    let light = Rgb::new(250, 240, 200);
    let lowered = ensure_max_luma(light, 0.45);
    assert!(lowered.luma() <= 0.45);

    let untouched = Rgb::new(200, 200, 200);
    assert_eq!(ensure_min_luma(untouched, 0.5), untouched);
}
