//! Path grammar and resolver behavior against realistic trees.

use super::test_utils::list_tree;
use uitree::error::ErrorKind;
use uitree::store::default_tree;
use uitree::tree::{resolve, resolve_mut, Access, Path, Slot, TreeValue};

#[test]
fn test_resolve_default_tree_item2() {
    let tree = default_tree();
    let node = resolve(&tree, &Path::parse("item2").unwrap()).unwrap();
    assert!(node.is_map());
    assert_eq!(node.get("text").and_then(TreeValue::as_str), Some("Item 2"));
}

#[test]
fn test_resolve_list_position_zero() {
    let tree = list_tree();
    let node = resolve(&tree, &Path::parse("listContainer.children.0").unwrap()).unwrap();
    assert_eq!(node.id().as_deref(), Some("a"));
}

#[test]
fn test_resolve_list_position_out_of_range() {
    let tree = list_tree();
    let err = resolve(&tree, &Path::parse("listContainer.children.5").unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    assert_eq!(err.path(), "listContainer.children.5");
}

#[test]
fn test_root_prefix_is_equivalent() {
    let tree = list_tree();
    let bare = resolve(&tree, &Path::parse("listContainer.children.b").unwrap()).unwrap();
    let rooted = resolve(&tree, &Path::parse("root.listContainer.children.b").unwrap()).unwrap();
    assert_eq!(bare, rooted);
}

#[test]
fn test_root_only_as_first_segment() {
    let err = Path::parse("listContainer.root").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPath);
}

#[test]
fn test_malformed_paths() {
    for raw in ["", ".", "a..b", "a.", ".a"] {
        let err = Path::parse(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPath, "path {:?}", raw);
    }
}

#[test]
fn test_missing_id_is_child_not_found() {
    let tree = list_tree();
    let err = resolve(&tree, &Path::parse("listContainer.children.zzz").unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChildNotFound);
}

#[test]
fn test_missing_intermediate_is_path_not_found() {
    let tree = list_tree();
    let err = resolve(&tree, &Path::parse("nothing.here").unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
}

#[test]
fn test_descending_into_scalar_is_type_mismatch() {
    let tree = list_tree();
    let err = resolve(&tree, &Path::parse("statusLabel.text.deeper").unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_upsert_reference_allows_append_slot() {
    let mut tree = list_tree();
    let path = Path::parse("listContainer.children.3").unwrap();
    let reference = resolve_mut(&mut tree, &path, Access::Upsert).unwrap();
    assert_eq!(reference.slot(), &Slot::Append { id: None });

    let path = Path::parse("listContainer.children.4").unwrap();
    let err = resolve_mut(&mut tree, &path, Access::Upsert).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
}

#[test]
fn test_write_through_reference() {
    let mut tree = list_tree();
    let path = Path::parse("listContainer.children.b").unwrap();
    let reference = resolve_mut(&mut tree, &path, Access::Read).unwrap();
    reference
        .set(TreeValue::from(serde_json::json!({"id": "b", "text": "Bee"})))
        .unwrap();
    let node = resolve(&tree, &path).unwrap();
    assert_eq!(node.get("text").and_then(TreeValue::as_str), Some("Bee"));
}
