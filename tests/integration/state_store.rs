//! StateStore lifecycle: replace, history windows, reset.

use serde_json::json;
use uitree::patch::{Patch, PatchBatch};
use uitree::store::{default_tree, StateStore, UpdateMode};
use uitree::tree::TreeValue;

fn with_item2_bg(color: &str) -> TreeValue {
    let mut tree = default_tree();
    tree.as_map_mut()
        .unwrap()
        .get_mut("item2")
        .unwrap()
        .as_map_mut()
        .unwrap()
        .insert("bgColor".to_string(), TreeValue::string(color));
    tree
}

#[test]
fn test_replace_changing_one_field_yields_one_record() {
    let store = StateStore::new(default_tree());
    let receipt = store.replace_all("recolor", with_item2_bg("#ff9800")).unwrap();

    assert_eq!(receipt.changes.len(), 1);
    let change = &receipt.changes[0];
    assert_eq!(change.target, "item2");
    assert_eq!(change.old, default_tree().get("item2").cloned().unwrap());
    assert_eq!(
        change.new.get("bgColor").and_then(TreeValue::as_str),
        Some("#ff9800")
    );
    assert_eq!(store.current(), with_item2_bg("#ff9800"));
}

#[test]
fn test_reset_restores_default_after_mutations() {
    let store = StateStore::new(default_tree());
    store
        .apply_batch(
            "one",
            &PatchBatch::single(Patch::new("statusLabel").upsert("text", "busy")),
        )
        .unwrap();
    store
        .apply_batch("two", &PatchBatch::single(Patch::new("item1").delete("item1")))
        .unwrap();
    store
        .replace_all("three", TreeValue::from(json!({"id": "page", "type": "Panel"})))
        .unwrap();
    assert_ne!(store.current(), default_tree());

    store.reset().unwrap();
    assert_eq!(store.current(), default_tree());
    assert_eq!(
        store.current().to_json_string().unwrap(),
        default_tree().to_json_string().unwrap()
    );
    assert_eq!(store.total_messages(), 0);
}

#[test]
fn test_sequence_restarts_after_reset() {
    let store = StateStore::new(default_tree());
    for text in ["a", "b", "c"] {
        store
            .apply_batch(text, &PatchBatch::single(Patch::new("item3").upsert("text", text)))
            .unwrap();
    }
    assert_eq!(store.status().next_sequence, 4);

    store.reset().unwrap();
    assert_eq!(store.status().next_sequence, 1);
    let receipt = store
        .apply_batch("after", &PatchBatch::single(Patch::new("item3").upsert("text", "d")))
        .unwrap();
    assert_eq!(receipt.sequence, 1);
}

#[test]
fn test_history_window_is_newest_last() {
    let store = StateStore::new(default_tree());
    for i in 0..5 {
        let instruction = format!("step {}", i);
        store
            .apply_batch(
                &instruction,
                &PatchBatch::single(Patch::new("item1").upsert("text", instruction.as_str())),
            )
            .unwrap();
    }
    let window = store.history(2);
    let instructions: Vec<&str> = window.iter().map(|e| e.instruction.as_str()).collect();
    assert_eq!(instructions, vec!["step 3", "step 4"]);
    assert_eq!(store.history(100).len(), 5);
    assert!(store.history(0).is_empty());
}

#[test]
fn test_history_records_mode_and_payload() {
    let store = StateStore::new(default_tree());
    let batch = PatchBatch::single(Patch::new("item1").upsert("text", "x"));
    store.apply_batch("patch it", &batch).unwrap();
    store.replace_all("replace it", with_item2_bg("#000000")).unwrap();

    let log = store.history(10);
    assert_eq!(log[0].mode, UpdateMode::Incremental);
    assert_eq!(log[0].batch.as_ref(), Some(&batch));
    assert_eq!(log[1].mode, UpdateMode::Full);
    assert_eq!(log[1].changes.len(), 2);
    assert!(log[0].timestamp <= log[1].timestamp);
}

#[test]
fn test_current_is_a_deep_copy() {
    let store = StateStore::new(default_tree());
    let mut copy = store.current();
    copy.as_map_mut().unwrap().clear();
    assert_eq!(store.current(), default_tree());
}

#[test]
fn test_status_reflects_tree() {
    let store = StateStore::new(default_tree());
    let before = store.status();
    assert_eq!(before.top_level_count, 4);
    assert!(before.supports_incremental && before.supports_full);
    assert!(!before.persistent);

    store
        .apply_batch("x", &PatchBatch::single(Patch::new("item1").upsert("text", "x")))
        .unwrap();
    let after = store.status();
    assert_ne!(before.digest, after.digest);
    assert_eq!(after.message_count, 1);
}
