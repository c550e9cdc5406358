use super::*;

fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("unify-storage-{label}-{}", uuid::Uuid::new_v4()))
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    store.set("theme", "dark".into()).unwrap();
    assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));

    store.remove("theme").unwrap();
    assert_eq!(store.get("theme").unwrap(), None);
}

#[test]
fn memory_store_remove_missing_key_is_ok() {
    let store = MemoryStore::new();
    assert!(store.remove("nope").is_ok());
}

#[test]
fn memory_store_clear_empties() {
    let store = MemoryStore::new();
    store.set("a", "1".into()).unwrap();
    store.set("b", "2".into()).unwrap();
    assert_eq!(store.len().unwrap(), 2);

    store.clear().unwrap();
    assert!(store.is_empty().unwrap());
}

// =============================================================================
// JsonFileStore
// =============================================================================

#[test]
fn file_store_persists_across_reopen() {
    let dir = temp_dir("reopen");
    let path = dir.join("local.json");

    let store = JsonFileStore::open(&path).unwrap();
    store.set("draft", "hello".into()).unwrap();
    drop(store);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.get("draft").unwrap().as_deref(), Some("hello"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn file_store_missing_file_starts_empty() {
    let dir = temp_dir("missing");
    let store = JsonFileStore::open(dir.join("local.json")).unwrap();
    assert!(store.is_empty().unwrap());
}

#[test]
fn file_store_clear_is_persisted() {
    let dir = temp_dir("clear");
    let path = dir.join("local.json");

    let store = JsonFileStore::open(&path).unwrap();
    store.set("a", "1".into()).unwrap();
    store.clear().unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    assert!(reopened.is_empty().unwrap());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn file_store_corrupt_file_errors() {
    let dir = temp_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("local.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = JsonFileStore::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt(_)));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn file_store_failed_write_leaves_memory_and_disk_in_step() {
    let dir = temp_dir("failed-write");
    let path = dir.join("local.json");

    let store = JsonFileStore::open(&path).unwrap();
    store.set("user", "{}".into()).unwrap();
    store.set("theme", "dark".into()).unwrap();

    // Block the temp file so the next rewrite cannot land.
    std::fs::create_dir_all(dir.join("local.json.tmp")).unwrap();

    assert!(matches!(store.remove("user"), Err(StorageError::Io(_))));
    assert!(matches!(store.clear(), Err(StorageError::Io(_))));
    assert!(matches!(store.set("extra", "x".into()), Err(StorageError::Io(_))));

    let reopened = JsonFileStore::open(&path).unwrap();
    for key in ["user", "theme", "extra"] {
        assert_eq!(store.get(key).unwrap(), reopened.get(key).unwrap(), "{key}");
    }
    assert_eq!(store.get("user").unwrap().as_deref(), Some("{}"));
    assert_eq!(store.len().unwrap(), 2);

    let _ = std::fs::remove_dir_all(dir);
}

// =============================================================================
// MemoryCacheStorage
// =============================================================================

#[tokio::test]
async fn memory_cache_keys_sorted_and_delete() {
    let caches = MemoryCacheStorage::new();
    caches.open("workbox-runtime").unwrap();
    caches.open("api-v1").unwrap();

    assert_eq!(caches.keys().await.unwrap(), vec!["api-v1", "workbox-runtime"]);
    assert!(caches.delete("api-v1").await.unwrap());
    assert!(!caches.delete("api-v1").await.unwrap());
    assert_eq!(caches.keys().await.unwrap(), vec!["workbox-runtime"]);
}

// =============================================================================
// DirCacheStorage
// =============================================================================

#[tokio::test]
async fn dir_cache_missing_root_has_no_keys() {
    let caches = DirCacheStorage::new(temp_dir("no-root"));
    assert!(caches.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn dir_cache_open_list_delete() {
    let root = temp_dir("caches");
    let caches = DirCacheStorage::new(&root);
    caches.open("images").await.unwrap();
    caches.open("api").await.unwrap();
    std::fs::write(root.join("stray.txt"), "x").unwrap();

    assert_eq!(caches.keys().await.unwrap(), vec!["api", "images"]);
    assert!(caches.delete("images").await.unwrap());
    assert!(!caches.delete("images").await.unwrap());
    assert_eq!(caches.keys().await.unwrap(), vec!["api"]);

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn dir_cache_rejects_path_escape() {
    let caches = DirCacheStorage::new(temp_dir("escape"));
    let err = caches.delete("../etc").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidName(_)));
    assert!(matches!(caches.open("..").await, Err(StorageError::InvalidName(_))));
}
