//! Recursive UI tree value: scalar leaves, keyed maps, ordered lists.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered map of keyed children. Insertion order is preserved for
/// serialization; equality ignores it.
pub type TreeMap = IndexMap<String, TreeValue>;

/// Leaf value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    /// Textual form used when a scalar is compared against a path segment.
    pub fn as_segment_text(&self) -> Option<String> {
        match self {
            Scalar::String(s) => Some(s.clone()),
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Bool(_) | Scalar::Null => None,
        }
    }
}

/// A node of the UI tree.
///
/// Map equality is order-insensitive, list equality is order-sensitive.
/// `Clone` is a deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeValue {
    Scalar(Scalar),
    List(Vec<TreeValue>),
    Map(TreeMap),
}

impl Default for TreeValue {
    fn default() -> Self {
        TreeValue::empty_map()
    }
}

impl TreeValue {
    pub fn empty_map() -> Self {
        TreeValue::Map(TreeMap::new())
    }

    pub fn null() -> Self {
        TreeValue::Scalar(Scalar::Null)
    }

    pub fn string(s: impl Into<String>) -> Self {
        TreeValue::Scalar(Scalar::String(s.into()))
    }

    /// Parse a JSON document, keeping object key order.
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            TreeValue::Scalar(Scalar::Null) => "null",
            TreeValue::Scalar(Scalar::Bool(_)) => "bool",
            TreeValue::Scalar(Scalar::Number(_)) => "number",
            TreeValue::Scalar(Scalar::String(_)) => "string",
            TreeValue::List(_) => "list",
            TreeValue::Map(_) => "map",
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TreeValue::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TreeValue::List(_))
    }

    pub fn as_map(&self) -> Option<&TreeMap> {
        match self {
            TreeValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut TreeMap> {
        match self {
            TreeValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<TreeValue>> {
        match self {
            TreeValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Map lookup; `None` for absent keys and non-map nodes.
    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// The node's own `id` scalar, as used for list-by-id addressing.
    pub fn id(&self) -> Option<String> {
        match self.get("id") {
            Some(TreeValue::Scalar(scalar)) => scalar.as_segment_text(),
            _ => None,
        }
    }

    /// Number of immediate children (0 for scalars).
    pub fn len(&self) -> usize {
        match self {
            TreeValue::Map(m) => m.len(),
            TreeValue::List(l) => l.len(),
            TreeValue::Scalar(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<serde_json::Value> for TreeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => TreeValue::Scalar(Scalar::Null),
            Value::Bool(b) => TreeValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => TreeValue::Scalar(Scalar::Number(n)),
            Value::String(s) => TreeValue::Scalar(Scalar::String(s)),
            Value::Array(items) => TreeValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => {
                TreeValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&TreeValue> for serde_json::Value {
    fn from(value: &TreeValue) -> Self {
        use serde_json::Value;
        match value {
            TreeValue::Scalar(Scalar::Null) => Value::Null,
            TreeValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            TreeValue::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            TreeValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            TreeValue::List(items) => Value::Array(items.iter().map(Into::into).collect()),
            TreeValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        TreeValue::string(s)
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        TreeValue::string(s)
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        TreeValue::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for TreeValue {
    fn from(n: i64) -> Self {
        TreeValue::Scalar(Scalar::Number(n.into()))
    }
}

impl fmt::Display for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}
