use super::*;

#[test]
fn memory_store_roundtrips_and_invalidates() {
    let store = MemoryBlobStore::new();
    store.write("jobs/a/layout.json", b"{}").unwrap();
    assert_eq!(store.read("jobs/a/layout.json").unwrap().as_deref(), Some(&b"{}"[..]));
    assert_eq!(store.keys(), vec!["jobs/a/layout.json".to_string()]);
    store.invalidate("jobs/a/layout.json").unwrap();
    assert!(store.read("jobs/a/layout.json").unwrap().is_none());
}

#[test]
fn keys_are_normalized_and_traversal_rejected() {
    let store = MemoryBlobStore::new();
    store.write("a\\b.json", b"1").unwrap();
    assert!(store.read("a/./b.json").unwrap().is_some());
    assert!(store.write("../escape.json", b"x").is_err());
}

#[test]
fn noop_store_forgets_everything() {
    let store = NoopBlobStore;
    store.write("k", b"v").unwrap();
    assert!(store.read("k").unwrap().is_none());
}

#[test]
fn dir_store_creates_parents() {
    let root = std::path::PathBuf::from("target").join("dir_blob_store_unit");
    let _ = std::fs::remove_dir_all(&root);
    let store = DirBlobStore::new(&root);
    write_json(&store, "jobs/x/export-audit.json", &serde_json::json!({"ok": true})).unwrap();
    let v: Option<serde_json::Value> = read_json(&store, "jobs/x/export-audit.json").unwrap();
    assert_eq!(v, Some(serde_json::json!({"ok": true})));
    assert!(read_json::<serde_json::Value>(&store, "missing.json").unwrap().is_none());
}
