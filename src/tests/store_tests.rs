// src/tests/store_tests.rs

use crate::db::{Database, SqliteSnapshotStore};
use crate::errors::StoreError;
use crate::store::{FileSnapshotStore, SnapshotStore};
use crate::tests::utils::doc;
use serde_json::json;

fn sqlite_store() -> (tempfile::TempDir, SqliteSnapshotStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("snapshots.sqlite3");
    let store = SqliteSnapshotStore::open(Database::new(path.to_string_lossy().to_string()))
        .expect("open sqlite store");
    (dir, store)
}

fn version_count(store: &SqliteSnapshotStore, case_id: &str) -> i64 {
    store
        .database()
        .with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM case_snapshots WHERE case_id = ?",
                [case_id],
                |row| row.get(0),
            )
            .map_err(StoreError::from)
        })
        .unwrap()
}

#[test]
fn file_store_missing_case_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::new(dir.path()).unwrap();
    assert_eq!(store.load("IOE1").unwrap(), None);
}

#[test]
fn file_store_returns_last_saved_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::new(dir.path().join("nested/state")).unwrap();

    store.save("IOE1", &doc(json!({"status": "Received"}))).unwrap();
    store
        .save("IOE1", &doc(json!({"status": "Approved", "history": [1, 2]})))
        .unwrap();

    assert_eq!(
        store.load("IOE1").unwrap(),
        Some(doc(json!({"status": "Approved", "history": [1, 2]})))
    );
    assert_eq!(store.load("IOE2").unwrap(), None);
}

#[test]
fn file_store_keeps_cases_apart_and_encodes_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::new(dir.path()).unwrap();

    store.save("../escape", &doc(json!({"status": "A"}))).unwrap();
    store.save("IOE2", &doc(json!({"status": "B"}))).unwrap();

    let path = store.path_for("../escape");
    assert_eq!(path.parent(), Some(dir.path()));
    assert!(path.exists());
    assert_eq!(store.load("../escape").unwrap(), Some(doc(json!({"status": "A"}))));
    assert_eq!(store.load("IOE2").unwrap(), Some(doc(json!({"status": "B"}))));
}

#[test]
fn file_store_ids_that_differ_only_in_separators_get_their_own_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::new(dir.path()).unwrap();
    let ids = ["a/b", "a_b", "a%2Fb", "a+b", "a b", "../x", "___x"];

    for (i, id) in ids.iter().enumerate() {
        store.save(id, &doc(json!({"status": i}))).unwrap();
    }

    for (i, id) in ids.iter().enumerate() {
        assert_eq!(store.load(id).unwrap(), Some(doc(json!({"status": i}))), "{id}");
        assert_eq!(store.path_for(id).parent(), Some(dir.path()));
    }
}

#[test]
fn file_store_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::new(dir.path()).unwrap();
    std::fs::write(store.path_for("IOE1"), "{not json").unwrap();

    assert!(matches!(store.load("IOE1"), Err(StoreError::Serialization(_))));
}

#[test]
fn file_store_rejects_snapshot_of_another_case() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::new(dir.path()).unwrap();
    store.save("IOE1", &doc(json!({"status": "A"}))).unwrap();
    std::fs::copy(store.path_for("IOE1"), store.path_for("IOE2")).unwrap();

    assert!(matches!(store.load("IOE2"), Err(StoreError::Corrupt(_))));
}

#[test]
fn sqlite_store_loads_latest_version() {
    let (_dir, store) = sqlite_store();
    assert_eq!(store.load("IOE1").unwrap(), None);

    store.save("IOE1", &doc(json!({"status": "Received"}))).unwrap();
    store.save("IOE1", &doc(json!({"status": "Approved"}))).unwrap();
    store.save("IOE2", &doc(json!({"status": "Other"}))).unwrap();

    assert_eq!(store.load("IOE1").unwrap(), Some(doc(json!({"status": "Approved"}))));
    assert_eq!(store.load("IOE2").unwrap(), Some(doc(json!({"status": "Other"}))));
    assert_eq!(version_count(&store, "IOE1"), 2);
}

#[test]
fn sqlite_store_skips_identical_consecutive_versions() {
    let (_dir, store) = sqlite_store();

    store.save("IOE1", &doc(json!({"a": 1, "b": 2}))).unwrap();
    store.save("IOE1", &doc(json!({"b": 2, "a": 1}))).unwrap();
    assert_eq!(version_count(&store, "IOE1"), 1);

    store.save("IOE1", &doc(json!({"a": 1, "b": 3}))).unwrap();
    store.save("IOE1", &doc(json!({"a": 1, "b": 2}))).unwrap();
    assert_eq!(version_count(&store, "IOE1"), 3);
}

#[test]
fn sqlite_store_corrupt_body_is_an_error() {
    let (_dir, store) = sqlite_store();
    store
        .database()
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO case_snapshots (case_id, fetched_at, fingerprint, body) VALUES ('IOE1', 'now', 'x', '[1, 2]')",
                [],
            )
            .map_err(StoreError::from)
        })
        .unwrap();

    assert!(matches!(store.load("IOE1"), Err(StoreError::Corrupt(_))));
}
