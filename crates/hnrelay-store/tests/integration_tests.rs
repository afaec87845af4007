//! Integration tests for hnrelay-store
//!
//! These tests verify that flushed state survives a reopen for both
//! snapshot formats, and that broken snapshots refuse to load.

use chrono::{Duration, Utc};
use hnrelay_domain::{MessageHandle, TrackedItem};
use hnrelay_store::{StoreError, TrackedStore};
use std::fs;
use tempfile::TempDir;

fn sample_items() -> Vec<TrackedItem> {
    let now = Utc::now();
    vec![
        TrackedItem::synced_at(41_000_001, MessageHandle::from_value(101), now),
        TrackedItem::synced_at(41_000_002, MessageHandle::from_value(102), now - Duration::hours(3)),
        TrackedItem::synced_at(41_000_003, MessageHandle::from_value(103), now - Duration::hours(30)),
    ]
}

fn assert_round_trip(file_name: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(file_name);

    let store = TrackedStore::open(&path).unwrap();
    assert!(store.is_empty().unwrap(), "Absent snapshot should load empty");
    for item in sample_items() {
        store.put(item).unwrap();
    }
    store.flush().unwrap();
    drop(store);

    let reopened = TrackedStore::open(&path).unwrap();
    assert_eq!(reopened.list().unwrap(), sample_items());
}

#[test]
fn test_sqlite_round_trip() {
    assert_round_trip("stories.db");
}

#[test]
fn test_json_round_trip() {
    assert_round_trip("stories.json");
}

#[test]
fn test_unflushed_changes_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stories.db");

    let store = TrackedStore::open(&path).unwrap();
    store.put(TrackedItem::new(1, MessageHandle::from_value(10))).unwrap();
    store.flush().unwrap();
    store.put(TrackedItem::new(2, MessageHandle::from_value(20))).unwrap();
    drop(store);

    let reopened = TrackedStore::open(&path).unwrap();
    assert_eq!(reopened.len().unwrap(), 1);
    assert!(reopened.get(2).unwrap().is_none());
}

#[test]
fn test_deletion_is_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stories.json");

    let store = TrackedStore::open(&path).unwrap();
    store.put(TrackedItem::new(1, MessageHandle::from_value(10))).unwrap();
    store.put(TrackedItem::new(2, MessageHandle::from_value(20))).unwrap();
    store.flush().unwrap();

    store.delete(1).unwrap();
    store.flush().unwrap();
    drop(store);

    let reopened = TrackedStore::open(&path).unwrap();
    let ids: Vec<i64> = reopened.list().unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_corrupt_sqlite_file_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stories.db");
    fs::write(&path, "not a sqlite database ".repeat(64)).unwrap();

    let result = TrackedStore::open(&path);
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[test]
fn test_corrupt_json_file_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stories.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let result = TrackedStore::open(&path);
    assert!(matches!(result, Err(StoreError::Json(_))));
}
