// tests/cursor_store.rs
use tempfile::tempdir;

use video_announcer::tracker::store::{CursorStore, FileCursorStore};

#[tokio::test]
async fn missing_file_means_no_cursor_yet() {
    let dir = tempdir().unwrap();
    let store = FileCursorStore::new(dir.path().join("last_video.json"));
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn save_then_load_roundtrips_and_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let store = FileCursorStore::new(dir.path().join("state/nested/last_video.json"));

    store.save("vid-123").await.unwrap();
    assert_eq!(store.load().await.as_deref(), Some("vid-123"));

    // Advance overwrites the single record.
    store.save("vid-456").await.unwrap();
    assert_eq!(store.load().await.as_deref(), Some("vid-456"));
}

#[tokio::test]
async fn record_uses_the_last_video_id_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_video.json");
    tokio::fs::write(&path, r#"{ "lastVideoId": "abc" }"#)
        .await
        .unwrap();

    let store = FileCursorStore::new(&path);
    assert_eq!(store.load().await.as_deref(), Some("abc"));
}

#[tokio::test]
async fn malformed_record_is_treated_as_first_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_video.json");
    tokio::fs::write(&path, "{ not json at all").await.unwrap();

    let store = FileCursorStore::new(&path);
    assert_eq!(store.load().await, None);

    // And the store still accepts a fresh save afterwards.
    store.save("vid-789").await.unwrap();
    assert_eq!(store.load().await.as_deref(), Some("vid-789"));
}

#[tokio::test]
async fn null_id_in_record_is_no_cursor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_video.json");
    tokio::fs::write(&path, r#"{ "lastVideoId": null }"#)
        .await
        .unwrap();

    let store = FileCursorStore::new(&path);
    assert_eq!(store.load().await, None);
}
