//! Top-level change detection between two trees.
//!
//! The comparison is one level deep: every top-level key of the new tree
//! whose value differs from the old one yields a [`ChangeRecord`] carrying
//! the complete old and new subtrees. Keys present only in the old tree are
//! not reported, so replaying the records as upserts over the old tree does
//! not reproduce removals.

use crate::patch::{Patch, PatchBatch};
use crate::tree::path::ROOT_SEGMENT;
use crate::tree::TreeValue;
use serde::{Deserialize, Serialize};

/// One changed top-level node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Top-level key, or `root` when the trees are not both maps.
    pub target: String,
    /// Previous value; an empty map when the key did not exist.
    pub old: TreeValue,
    pub new: TreeValue,
}

/// Compare `old` and `new`, in the key order of `new`.
pub fn diff(old: &TreeValue, new: &TreeValue) -> Vec<ChangeRecord> {
    let (Some(old_map), Some(new_map)) = (old.as_map(), new.as_map()) else {
        if old == new {
            return Vec::new();
        }
        return vec![ChangeRecord {
            target: ROOT_SEGMENT.to_string(),
            old: old.clone(),
            new: new.clone(),
        }];
    };

    new_map
        .iter()
        .filter_map(|(key, new_value)| {
            let old_value = old_map.get(key);
            if old_value == Some(new_value) {
                return None;
            }
            Some(ChangeRecord {
                target: key.clone(),
                old: old_value.cloned().unwrap_or_else(TreeValue::empty_map),
                new: new_value.clone(),
            })
        })
        .collect()
}

/// Keys of `old` that `new` dropped. [`diff`] never reports these.
pub fn removed_keys(old: &TreeValue, new: &TreeValue) -> Vec<String> {
    match (old.as_map(), new.as_map()) {
        (Some(old_map), Some(new_map)) => old_map
            .keys()
            .filter(|key| !new_map.contains_key(key.as_str()))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Re-express change records as a batch that upserts each new subtree into
/// its parent. Applying it to the old tree reproduces every changed key.
pub fn upsert_batch(records: &[ChangeRecord]) -> PatchBatch {
    records
        .iter()
        .map(|record| Patch::new(ROOT_SEGMENT).upsert(record.target.clone(), record.new.clone()))
        .collect::<Vec<_>>()
        .into()
}
