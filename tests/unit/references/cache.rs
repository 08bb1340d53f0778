use super::*;
use crate::store::blob::MemoryBlobStore;

fn write_refs(dir: &Path, n: u32) {
    let _ = std::fs::remove_dir_all(dir);
    std::fs::create_dir_all(dir).unwrap();
    for i in 0..n {
        let img = image::RgbImage::from_fn(32, 24, |x, _| {
            if x < 8 * (i % 4 + 1) { image::Rgb([30, 40, 90]) } else { image::Rgb([250, 250, 250]) }
        });
        img.save(dir.join(format!("r{i:02}.png"))).unwrap();
    }
}

#[test]
fn below_minimum_is_not_required() {
    let dir = PathBuf::from("target").join("ref_cache_small");
    write_refs(&dir, 3);
    let cache = ReferenceIndexCache::new(Arc::new(MemoryBlobStore::new()), DEFAULT_MIN_REFERENCES);
    let ctx = cache.ensure(&dir, None).unwrap();
    assert_eq!(ctx.status, IndexStatus::NotRequired);
    assert_eq!(ctx.reference_count, 3);
    assert!(ctx.index.is_none());
}

#[test]
fn second_ensure_reuses_and_snapshot_survives_new_cache() {
    let dir = PathBuf::from("target").join("ref_cache_reuse");
    write_refs(&dir, 9);
    let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());

    let cache = ReferenceIndexCache::new(store.clone(), DEFAULT_MIN_REFERENCES);
    let first = cache.ensure(&dir, None).unwrap();
    assert_eq!(first.status, IndexStatus::Rebuilt);
    let second = cache.ensure(&dir, None).unwrap();
    assert_eq!(second.status, IndexStatus::Reused);
    assert_eq!(first.reference_digest(), second.reference_digest());

    let fresh_process = ReferenceIndexCache::new(store, DEFAULT_MIN_REFERENCES);
    let third = fresh_process.ensure(&dir, None).unwrap();
    assert_eq!(third.status, IndexStatus::Reused);
}

#[test]
fn invalidate_forces_rebuild() {
    let dir = PathBuf::from("target").join("ref_cache_invalidate");
    write_refs(&dir, 8);
    let cache = ReferenceIndexCache::new(Arc::new(MemoryBlobStore::new()), 8);
    let first = cache.ensure(&dir, None).unwrap();
    cache.invalidate(&dir, &first.structure_digest).unwrap();
    let again = cache.ensure(&dir, None).unwrap();
    assert_eq!(again.status, IndexStatus::Rebuilt);
}

#[test]
fn concurrent_requests_share_one_build() {
    let dir = PathBuf::from("target").join("ref_cache_concurrent");
    write_refs(&dir, 8);
    let cache = Arc::new(ReferenceIndexCache::new(Arc::new(MemoryBlobStore::new()), 8));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let dir = dir.clone();
            std::thread::spawn(move || cache.ensure(&dir, None).unwrap().status)
        })
        .collect();
    let statuses: Vec<IndexStatus> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        statuses.iter().filter(|s| **s == IndexStatus::Rebuilt).count(),
        1
    );
}

/// Flip one byte of `path` in place and restore its modification time.
fn rewrite_same_size(path: &Path) {
    let modified = std::fs::metadata(path).unwrap().modified().unwrap();
    let mut bytes = std::fs::read(path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    std::fs::write(path, &bytes).unwrap();
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

#[test]
fn changed_bytes_with_same_structure_force_rebuild() {
    let dir = PathBuf::from("target").join("ref_cache_content");
    write_refs(&dir, 8);
    let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
    let cache = ReferenceIndexCache::new(store.clone(), 8);
    let first = cache.ensure(&dir, None).unwrap();
    assert_eq!(first.status, IndexStatus::Rebuilt);

    rewrite_same_size(&dir.join("r03.png"));
    let second = cache.ensure(&dir, None).unwrap();
    assert_eq!(second.structure_digest, first.structure_digest);
    assert_eq!(second.status, IndexStatus::Rebuilt);
    let before = first.index.as_deref().unwrap();
    let after = second.index.as_deref().unwrap();
    assert_ne!(before.content_digest, after.content_digest);

    let fresh_process = ReferenceIndexCache::new(store, 8);
    let third = fresh_process.ensure(&dir, None).unwrap();
    assert_eq!(third.status, IndexStatus::Reused);
    assert_eq!(third.reference_digest(), second.reference_digest());
}

#[test]
fn structure_change_drops_the_old_slot() {
    let dir = PathBuf::from("target").join("ref_cache_prune");
    write_refs(&dir, 8);
    let cache = ReferenceIndexCache::new(Arc::new(MemoryBlobStore::new()), 8);
    let first = cache.ensure(&dir, None).unwrap();

    image::RgbImage::from_pixel(20, 20, image::Rgb([200, 10, 10]))
        .save(dir.join("r99.png"))
        .unwrap();
    let second = cache.ensure(&dir, None).unwrap();
    assert_ne!(first.structure_digest, second.structure_digest);

    let slots = cache.slots.lock().unwrap();
    assert_eq!(slots.len(), 1);
    assert!(slots.contains_key(&(dir.clone(), second.structure_digest.clone())));
}
