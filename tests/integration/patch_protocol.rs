//! Patch wire format and application semantics.

use super::test_utils::list_tree;
use serde_json::json;
use uitree::error::ErrorKind;
use uitree::patch::{apply_batch, Patch, PatchBatch};
use uitree::store::default_tree;
use uitree::tree::{resolve, Path, TreeValue};

fn text_at<'a>(tree: &'a TreeValue, path: &str) -> Option<&'a str> {
    resolve(tree, &Path::parse(path).unwrap())
        .ok()
        .and_then(TreeValue::as_str)
}

#[test]
fn test_status_label_update_keeps_other_keys() {
    let mut start = default_tree();
    start
        .as_map_mut()
        .unwrap()
        .get_mut("statusLabel")
        .unwrap()
        .as_map_mut()
        .unwrap()
        .insert("weight".to_string(), TreeValue::string("bold"));

    let batch = PatchBatch::from_json_str(
        r##"{"target":"statusLabel","change":{"text":"done","color":"#2196f3"}}"##,
    )
    .unwrap();
    let outcome = apply_batch(&start, &batch).unwrap();

    assert_eq!(text_at(&outcome.tree, "statusLabel.text"), Some("done"));
    assert_eq!(text_at(&outcome.tree, "statusLabel.color"), Some("#2196f3"));
    assert_eq!(text_at(&outcome.tree, "statusLabel.weight"), Some("bold"));
}

#[test]
fn test_self_delete_removes_top_level_entry() {
    let batch =
        PatchBatch::from_json_str(r#"[{"target":"item1","change":{"item1":null}}]"#).unwrap();
    let outcome = apply_batch(&default_tree(), &batch).unwrap();
    assert!(outcome.tree.get("item1").is_none());
    assert!(outcome.tree.get("item2").is_some());
    assert_eq!(outcome.stats.removed_targets, 1);
}

#[test]
fn test_bare_object_is_one_element_batch() {
    let single = PatchBatch::from_json_str(r#"{"target":"item1","change":{"text":"x"}}"#).unwrap();
    let array = PatchBatch::from_json_str(r#"[{"target":"item1","change":{"text":"x"}}]"#).unwrap();
    assert_eq!(single, array);
    assert_eq!(single.len(), 1);
}

#[test]
fn test_null_and_absent_change_values_decode() {
    let batch =
        PatchBatch::from_json_str(r#"{"target":"item1","change":{"text":null,"n":0}}"#).unwrap();
    let patch = &batch.patches()[0];
    assert_eq!(patch.change.get("text"), Some(&None));
    assert_eq!(patch.change.get("n"), Some(&Some(TreeValue::from(0i64))));

    let empty = PatchBatch::from_json_str(r#"{"target":"item1"}"#).unwrap();
    assert!(empty.patches()[0].change.is_empty());
}

#[test]
fn test_batch_serializes_as_array() {
    let batch = PatchBatch::single(Patch::new("item1").delete("bgColor"));
    let value = serde_json::to_value(&batch).unwrap();
    assert_eq!(value, json!([{"target": "item1", "change": {"bgColor": null}}]));
}

#[test]
fn test_repeated_upsert_is_idempotent() {
    let batch = PatchBatch::single(Patch::new("item2").upsert("bgColor", "#ff9800"));
    let once = apply_batch(&default_tree(), &batch).unwrap().tree;
    let twice = apply_batch(&once, &batch).unwrap().tree;
    assert_eq!(once, twice);
}

#[test]
fn test_repeated_null_delete_never_errors() {
    let batch = PatchBatch::single(Patch::new("item2").delete("missing"));
    let mut tree = default_tree();
    for _ in 0..3 {
        let outcome = apply_batch(&tree, &batch).unwrap();
        assert_eq!(outcome.stats.noop_deletes, 1);
        assert_eq!(outcome.tree, default_tree());
        tree = outcome.tree;
    }
}

#[test]
fn test_list_child_removed_by_dotted_key() {
    let batch =
        PatchBatch::from_json_str(r#"{"target":"listContainer","change":{"children.b":null}}"#)
            .unwrap();
    let outcome = apply_batch(&list_tree(), &batch).unwrap();
    let children = resolve(&outcome.tree, &Path::parse("listContainer.children").unwrap()).unwrap();
    let ids: Vec<String> = children
        .as_list()
        .unwrap()
        .iter()
        .filter_map(TreeValue::id)
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn test_list_child_self_delete_by_id() {
    let batch = PatchBatch::single(Patch::new("listContainer.children.c").delete("c"));
    let outcome = apply_batch(&list_tree(), &batch).unwrap();
    let children = resolve(&outcome.tree, &Path::parse("listContainer.children").unwrap()).unwrap();
    assert_eq!(children.len(), 2);
}

#[test]
fn test_upsert_on_list_by_unknown_id_appends_with_id() {
    let batch = PatchBatch::single(
        Patch::new("listContainer.children").upsert("d", TreeValue::from(json!({"text": "D"}))),
    );
    let outcome = apply_batch(&list_tree(), &batch).unwrap();
    assert_eq!(text_at(&outcome.tree, "listContainer.children.d.text"), Some("D"));
    assert_eq!(text_at(&outcome.tree, "listContainer.children.3.id"), Some("d"));
}

#[test]
fn test_error_carries_patch_index_and_target() {
    let batch = PatchBatch::new(vec![
        Patch::new("item2").upsert("text", "fine"),
        Patch::new("listContainer.children.zzz").upsert("text", "nope"),
    ]);
    let err = apply_batch(&list_tree(), &batch).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.target, "listContainer.children.zzz");
    assert_eq!(err.kind(), ErrorKind::ChildNotFound);
    assert_eq!(err.source.path(), "listContainer.children.zzz");
}
