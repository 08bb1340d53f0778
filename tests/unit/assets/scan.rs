use super::*;

#[test]
fn normalize_rel_path_rejects_traversal_and_absolute() {
    assert_eq!(normalize_rel_path("a\\b/./c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn scanned_image_ids_are_stable_across_separators() {
    let a = ScannedImage::new("shots\\team.png", Some(10), Some(20)).unwrap();
    let b = ScannedImage::new("shots/team.png", None, None).unwrap();
    assert_eq!(a.id, b.id);
    assert!(a.id.starts_with("img-"));
    assert_eq!(a.aspect(), Some(0.5));
    assert_eq!(b.aspect(), None);
}

#[test]
fn font_family_comes_from_stem() {
    let f = ScannedFont::new("fonts/Inter-Bold.ttf").unwrap();
    assert_eq!(f.family, "Inter");
    assert!(f.is_heading_cut());
}

#[test]
fn scan_images_lists_sorted_and_filters_extensions() {
    let dir = std::path::PathBuf::from("target").join("scan_images_unit");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    let img = image::RgbImage::from_pixel(8, 4, image::Rgb([10, 20, 30]));
    img.save(dir.join("nested").join("b.png")).unwrap();
    img.save(dir.join("a.png")).unwrap();
    std::fs::write(dir.join("notes.txt"), b"skip").unwrap();

    let scanned = scan_images(&dir).unwrap();
    let names: Vec<&str> = scanned.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(names, vec!["a.png", "nested/b.png"]);
    assert_eq!(scanned[0].width_px, Some(8));
    assert_eq!(scanned[0].height_px, Some(4));
}
