//! All-or-nothing batches and serialized mutation through the store.

use super::test_utils::list_tree;
use std::sync::Arc;
use std::thread;
use uitree::error::ErrorKind;
use uitree::patch::{Patch, PatchBatch};
use uitree::store::{default_tree, StateStore};
use uitree::tree::TreeValue;

#[test]
fn test_good_then_bad_leaves_store_untouched() {
    let store = StateStore::new(default_tree());
    let before = store.current();
    let batch = PatchBatch::new(vec![
        Patch::new("statusLabel").upsert("text", "half way"),
        Patch::new("item1.missing.deeper").upsert("text", "nope"),
    ]);

    let err = store.apply_batch("broken", &batch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
    assert_eq!(store.current(), before);
    assert_eq!(store.total_messages(), 0);
    assert_eq!(store.status().next_sequence, 1);
}

#[test]
fn test_each_error_kind_rejects_batch() {
    let cases = [
        ("a..b", ErrorKind::MalformedPath),
        ("listContainer.children.9", ErrorKind::IndexOutOfRange),
        ("listContainer.children.nope", ErrorKind::ChildNotFound),
        ("statusLabel.text", ErrorKind::TypeMismatch),
        ("ghost.inner", ErrorKind::PathNotFound),
    ];
    for (target, kind) in cases {
        let store = StateStore::new(list_tree());
        let batch = PatchBatch::new(vec![
            Patch::new("item2").upsert("text", "changed"),
            Patch::new(target).upsert("x", 1i64),
        ]);
        let err = store.apply_batch("bad", &batch).unwrap_err();
        assert_eq!(err.kind(), kind, "target {}", target);
        assert_eq!(store.current(), list_tree(), "target {}", target);
    }
}

#[test]
fn test_failed_replace_leaves_store_untouched() {
    let store = StateStore::new(default_tree());
    let err = store
        .replace_all("scalar root", TreeValue::string("not a tree"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDocument);
    assert_eq!(store.current(), default_tree());
    assert_eq!(store.total_messages(), 0);
}

#[test]
fn test_concurrent_batches_never_interleave() {
    let store = StateStore::new(default_tree()).shared();
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let marker = format!("t{}-{}", t, i);
                    // Both patches carry the same marker; a torn batch would
                    // leave the two labels disagreeing.
                    let batch = PatchBatch::new(vec![
                        Patch::new("item1").upsert("text", marker.as_str()),
                        Patch::new("item2").upsert("text", marker.as_str()),
                    ]);
                    store.apply_batch(&marker, &batch).unwrap();
                    let snapshot = store.current();
                    assert_eq!(
                        snapshot.get("item1").unwrap().get("text"),
                        snapshot.get("item2").unwrap().get("text")
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = threads * per_thread;
    assert_eq!(store.total_messages(), total);
    let sequences: Vec<u64> = store.history(total).iter().map(|e| e.sequence).collect();
    let expected: Vec<u64> = (1..=total as u64).collect();
    assert_eq!(sequences, expected);
}
