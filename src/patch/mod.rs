//! Patch Protocol
//!
//! A patch addresses one node (`target`) and lists changes to its immediate
//! children (`change`). `null` deletes, anything else upserts. A batch is an
//! ordered list of patches applied all-or-nothing.
//!
//! Wire format:
//! ```json
//! [{"target": "statusLabel", "change": {"text": "done", "color": null}}]
//! ```
//! A bare patch object is accepted wherever a batch is expected.

pub mod apply;

pub use apply::{apply_batch, apply_patch, ApplyStats, BatchOutcome};

use crate::error::PathError;
use crate::tree::{Path, TreeValue};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Changes keyed by child key; `None` is a delete directive.
pub type ChangeSet = IndexMap<String, Option<TreeValue>>;

/// A single `{target, change}` instruction.
///
/// The target is kept as text and parsed during application, so an
/// unparseable target rejects its batch with `MalformedPath` instead of
/// failing at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub target: String,
    #[serde(default)]
    pub change: ChangeSet,
}

impl Patch {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            change: ChangeSet::new(),
        }
    }

    /// Builder: insert or overwrite `key`.
    pub fn upsert(mut self, key: impl Into<String>, value: impl Into<TreeValue>) -> Self {
        self.change.insert(key.into(), Some(value.into()));
        self
    }

    /// Builder: delete `key`.
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.change.insert(key.into(), None);
        self
    }

    pub fn target_path(&self) -> Result<Path, PathError> {
        Path::parse(&self.target)
    }
}

/// Ordered patches applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchBatch(Vec<Patch>);

impl PatchBatch {
    pub fn new(patches: Vec<Patch>) -> Self {
        Self(patches)
    }

    pub fn single(patch: Patch) -> Self {
        Self(vec![patch])
    }

    pub fn patches(&self) -> &[Patch] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Patch> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, patch: Patch) {
        self.0.push(patch);
    }

    pub fn into_inner(self) -> Vec<Patch> {
        self.0
    }

    /// Decode a batch from JSON text (array or single object).
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Distinct target strings, in first-seen order.
    pub fn targets(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for patch in &self.0 {
            if !seen.contains(&patch.target.as_str()) {
                seen.push(patch.target.as_str());
            }
        }
        seen
    }
}

impl From<Vec<Patch>> for PatchBatch {
    fn from(patches: Vec<Patch>) -> Self {
        Self(patches)
    }
}

impl<'a> IntoIterator for &'a PatchBatch {
    type Item = &'a Patch;
    type IntoIter = std::slice::Iter<'a, Patch>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for PatchBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchWire {
    Many(Vec<Patch>),
    One(Patch),
}

impl<'de> Deserialize<'de> for PatchBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match BatchWire::deserialize(deserializer)? {
            BatchWire::Many(patches) => PatchBatch(patches),
            BatchWire::One(patch) => PatchBatch(vec![patch]),
        })
    }
}
