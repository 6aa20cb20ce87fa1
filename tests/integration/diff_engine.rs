//! One-level diff and its documented asymmetry.

use serde_json::json;
use uitree::diff::{diff, removed_keys, upsert_batch};
use uitree::patch::apply_batch;
use uitree::store::default_tree;
use uitree::tree::TreeValue;

fn tree(value: serde_json::Value) -> TreeValue {
    TreeValue::from(value)
}

#[test]
fn test_identical_trees_have_no_changes() {
    assert!(diff(&default_tree(), &default_tree()).is_empty());
}

#[test]
fn test_added_key_reports_empty_map_as_old() {
    let old = tree(json!({"a": 1}));
    let new = tree(json!({"a": 1, "b": {"text": "new"}}));
    let changes = diff(&old, &new);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].target, "b");
    assert_eq!(changes[0].old, TreeValue::empty_map());
}

#[test]
fn test_nested_change_reports_whole_subtree() {
    let old = tree(json!({"panel": {"children": [{"id": "x", "text": "1"}], "title": "T"}}));
    let new = tree(json!({"panel": {"children": [{"id": "x", "text": "2"}], "title": "T"}}));
    let changes = diff(&old, &new);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].target, "panel");
    assert_eq!(changes[0].old, old.get("panel").cloned().unwrap());
    assert_eq!(changes[0].new, new.get("panel").cloned().unwrap());
}

#[test]
fn test_map_key_order_is_not_a_change() {
    let old = tree(json!({"a": {"x": 1, "y": 2}}));
    let new = tree(json!({"a": {"y": 2, "x": 1}}));
    assert!(diff(&old, &new).is_empty());
}

#[test]
fn test_list_order_is_a_change() {
    let old = tree(json!({"a": [1, 2]}));
    let new = tree(json!({"a": [2, 1]}));
    assert_eq!(diff(&old, &new).len(), 1);
}

#[test]
fn test_records_follow_new_key_order() {
    let old = tree(json!({"a": 1, "b": 1, "c": 1}));
    let new = tree(json!({"c": 2, "a": 2, "b": 1}));
    let targets: Vec<String> = diff(&old, &new).into_iter().map(|c| c.target).collect();
    assert_eq!(targets, vec!["c", "a"]);
}

#[test]
fn test_removed_keys_are_not_reported() {
    let old = default_tree();
    let mut new = default_tree();
    new.as_map_mut().unwrap().shift_remove("item3");

    assert!(diff(&old, &new).is_empty());
    assert_eq!(removed_keys(&old, &new), vec!["item3".to_string()]);
}

#[test]
fn test_replaying_records_does_not_reproduce_removals() {
    let old = tree(json!({"keep": 1, "change": {"v": 1}, "drop": true}));
    let new = tree(json!({"keep": 1, "change": {"v": 2}, "add": "x"}));

    let changes = diff(&old, &new);
    let replayed = apply_batch(&old, &upsert_batch(&changes)).unwrap().tree;

    // Every reported key is reproduced.
    for change in &changes {
        assert_eq!(replayed.get(&change.target), Some(&change.new));
    }
    // The removal is not, so the replay differs from the new tree.
    assert!(replayed.get("drop").is_some());
    assert_ne!(replayed, new);
}

#[test]
fn test_non_map_roots_compare_as_a_whole() {
    let changes = diff(&tree(json!([1])), &tree(json!([2])));
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].target, "root");
    assert!(diff(&tree(json!("same")), &tree(json!("same"))).is_empty());
}
