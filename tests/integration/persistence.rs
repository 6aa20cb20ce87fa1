//! Snapshot persistence behind the StateStore.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uitree::error::{ErrorKind, StorageError};
use uitree::patch::{Patch, PatchBatch};
use uitree::store::{
    default_tree, HistoryEntry, SledSnapshotStore, Snapshot, SnapshotStore, StateStore,
};
use uitree::tree::TreeValue;

fn open_store(snapshots: &SledSnapshotStore) -> StateStore {
    let backend = SledSnapshotStore::new(snapshots.db().clone()).unwrap();
    StateStore::open(default_tree(), Arc::new(backend)).unwrap()
}

#[test]
fn test_fresh_database_starts_from_default() {
    let dir = TempDir::new().unwrap();
    let snapshots = SledSnapshotStore::open(dir.path().join("store")).unwrap();
    let store = open_store(&snapshots);
    assert_eq!(store.current(), default_tree());
    assert!(store.is_persistent());
    assert_eq!(store.status().next_sequence, 1);
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let snapshots = SledSnapshotStore::open(dir.path().join("store")).unwrap();

    let first = open_store(&snapshots);
    first
        .apply_batch(
            "label",
            &PatchBatch::single(Patch::new("statusLabel").upsert("text", "saved")),
        )
        .unwrap();
    first
        .apply_batch("drop item3", &PatchBatch::single(Patch::new("item3").delete("item3")))
        .unwrap();
    let expected = first.current();
    drop(first);

    let second = open_store(&snapshots);
    assert_eq!(second.current(), expected);
    assert_eq!(second.total_messages(), 2);
    let receipt = second
        .apply_batch("third", &PatchBatch::single(Patch::new("item1").upsert("text", "3")))
        .unwrap();
    assert_eq!(receipt.sequence, 3);
}

#[test]
fn test_reset_is_persisted() {
    let dir = TempDir::new().unwrap();
    let snapshots = SledSnapshotStore::open(dir.path().join("store")).unwrap();

    let first = open_store(&snapshots);
    first
        .replace_all("page", TreeValue::from(serde_json::json!({"id": "p", "type": "Panel"})))
        .unwrap();
    first.reset().unwrap();
    drop(first);

    let second = open_store(&snapshots);
    assert_eq!(second.current(), default_tree());
    assert_eq!(second.total_messages(), 0);
    assert_eq!(second.status().next_sequence, 1);
}

/// Backend that can be switched into failure mode.
#[derive(Default)]
struct FlakySnapshots {
    failing: AtomicBool,
}

impl SnapshotStore for FlakySnapshots {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        Ok(None)
    }

    fn commit(
        &self,
        _tree: &TreeValue,
        _next_sequence: u64,
        _appended: &HistoryEntry,
    ) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Backend("disk full".to_string()))
        } else {
            Ok(())
        }
    }

    fn reset(&self, _tree: &TreeValue, _next_sequence: u64) -> Result<(), StorageError> {
        Ok(())
    }
}

#[test]
fn test_failed_write_leaves_memory_unchanged() {
    let backend = Arc::new(FlakySnapshots::default());
    let store = StateStore::open(default_tree(), backend.clone()).unwrap();
    store
        .apply_batch("ok", &PatchBatch::single(Patch::new("item1").upsert("text", "ok")))
        .unwrap();
    let before = store.current();

    backend.failing.store(true, Ordering::SeqCst);
    let err = store
        .apply_batch("lost", &PatchBatch::single(Patch::new("item1").upsert("text", "lost")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(store.current(), before);
    assert_eq!(store.total_messages(), 1);
    assert_eq!(store.status().next_sequence, 2);
}

/// Sled backend whose reset is refused.
struct ResetRefused {
    inner: SledSnapshotStore,
}

impl SnapshotStore for ResetRefused {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        self.inner.load()
    }

    fn commit(
        &self,
        tree: &TreeValue,
        next_sequence: u64,
        appended: &HistoryEntry,
    ) -> Result<(), StorageError> {
        self.inner.commit(tree, next_sequence, appended)
    }

    fn reset(&self, _tree: &TreeValue, _next_sequence: u64) -> Result<(), StorageError> {
        Err(StorageError::Backend("read-only".to_string()))
    }
}

#[test]
fn test_failed_reset_leaves_persisted_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let snapshots = SledSnapshotStore::open(dir.path().join("store")).unwrap();
    let backend = ResetRefused {
        inner: SledSnapshotStore::new(snapshots.db().clone()).unwrap(),
    };
    let store = StateStore::open(default_tree(), Arc::new(backend)).unwrap();
    store
        .apply_batch("one", &PatchBatch::single(Patch::new("item1").upsert("text", "1")))
        .unwrap();
    store
        .apply_batch("two", &PatchBatch::single(Patch::new("item2").upsert("text", "2")))
        .unwrap();
    let before = store.current();

    let err = store.reset().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(store.current(), before);
    assert_eq!(store.total_messages(), 2);
    drop(store);

    let persisted = snapshots.load().unwrap().unwrap();
    assert_eq!(persisted.tree, before);
    assert_eq!(persisted.log.len(), 2);
    assert_eq!(persisted.next_sequence, 3);

    let reopened = open_store(&snapshots);
    assert_eq!(reopened.current(), before);
    assert_eq!(reopened.status().next_sequence, 3);
}
