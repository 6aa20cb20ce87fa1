//! The fixed initial UI tree.

use crate::tree::{TreeMap, TreeValue};

pub const DEFAULT_TEXT_COLOR: &str = "#333333";
pub const DEFAULT_ITEM_BG: &str = "#f0f0f0";

fn node(fields: &[(&str, &str)]) -> TreeValue {
    let mut map = TreeMap::new();
    for (key, value) in fields {
        map.insert((*key).to_string(), TreeValue::string(*value));
    }
    TreeValue::Map(map)
}

/// Default label for item `n`, used by the default tree and reset rules.
pub fn item_node(n: usize) -> TreeValue {
    let text = format!("Item {}", n);
    node(&[("text", text.as_str()), ("bgColor", DEFAULT_ITEM_BG)])
}

/// The tree a store starts from and returns to on reset.
pub fn default_tree() -> TreeValue {
    let mut root = TreeMap::new();
    root.insert(
        "statusLabel".to_string(),
        node(&[("text", "ready"), ("color", DEFAULT_TEXT_COLOR)]),
    );
    for n in 1..=3 {
        root.insert(format!("item{}", n), item_node(n));
    }
    TreeValue::Map(root)
}
