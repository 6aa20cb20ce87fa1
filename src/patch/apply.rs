//! Patch application.
//!
//! Application is pure: [`apply_batch`] works on a copy of the tree and only
//! hands back the mutated copy when every patch succeeded. Callers commit the
//! returned tree; on error there is nothing to roll back.

use crate::error::{PatchError, PathError};
use crate::patch::{Patch, PatchBatch};
use crate::tree::resolver::{resolve_mut, resolve_segments_mut, Access};
use crate::tree::{Path, Segment, TreeValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Counts of what a batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyStats {
    pub upserts: usize,
    pub deletes: usize,
    /// Deletes whose key was already absent
    pub noop_deletes: usize,
    /// Targets removed via the self-delete idiom
    pub removed_targets: usize,
    /// Top-level nodes created because a patch targeted them first
    pub created_targets: usize,
}

impl ApplyStats {
    fn absorb(&mut self, other: ApplyStats) {
        self.upserts += other.upserts;
        self.deletes += other.deletes;
        self.noop_deletes += other.noop_deletes;
        self.removed_targets += other.removed_targets;
        self.created_targets += other.created_targets;
    }
}

/// Result of a successful batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub tree: TreeValue,
    pub stats: ApplyStats,
}

/// Apply a batch to a copy of `tree`.
///
/// Patches run left to right, each seeing the effects of the previous ones.
/// The first failing patch rejects the whole batch and `tree` is untouched.
pub fn apply_batch(tree: &TreeValue, batch: &PatchBatch) -> Result<BatchOutcome, PatchError> {
    let mut working = tree.clone();
    let mut stats = ApplyStats::default();

    for (index, patch) in batch.iter().enumerate() {
        let patch_stats = apply_patch(&mut working, patch)
            .map_err(|source| PatchError::new(index, patch.target.clone(), source))?;
        stats.absorb(patch_stats);
    }

    debug!(
        patches = batch.len(),
        upserts = stats.upserts,
        deletes = stats.deletes,
        "Batch applied to working copy"
    );
    Ok(BatchOutcome {
        tree: working,
        stats,
    })
}

/// Apply one patch in place.
///
/// Not atomic on its own: a failing change key may leave earlier keys of the
/// same patch applied. Use [`apply_batch`] for all-or-nothing semantics.
pub fn apply_patch(tree: &mut TreeValue, patch: &Patch) -> Result<ApplyStats, PathError> {
    let target = patch.target_path()?;
    let mut stats = ApplyStats::default();

    if create_top_level_target(tree, &target) {
        stats.created_targets += 1;
    }

    let reference = resolve_mut(tree, &target, Access::Read)?;
    let names = self_names(&target, reference.get());

    let self_delete = patch
        .change
        .iter()
        .any(|(key, value)| value.is_none() && names.iter().any(|name| name == key));
    if self_delete {
        trace!(target = %target, "Self-delete directive removes target");
        reference.remove();
        stats.removed_targets += 1;
        return Ok(stats);
    }

    let Some(node) = reference.into_mut() else {
        return Err(PathError::PathNotFound {
            path: target.to_string(),
            segment: target.last().map(Segment::text).unwrap_or_default(),
        });
    };
    if !(node.is_map() || node.is_list()) {
        return Err(PathError::TypeMismatch {
            path: target.to_string(),
            expected: "map or list",
            found: node.type_name(),
        });
    }

    for (key, value) in &patch.change {
        let relative = change_key_path(key)?;
        let display = target.join(&relative);
        match value {
            Some(value) => {
                resolve_segments_mut(node, relative.segments(), display.as_str(), Access::Upsert)?
                    .set(value.clone())?;
                stats.upserts += 1;
            }
            None => {
                let slot = resolve_segments_mut(
                    node,
                    relative.segments(),
                    display.as_str(),
                    Access::Delete,
                )?;
                if slot.remove().is_some() {
                    stats.deletes += 1;
                } else {
                    stats.noop_deletes += 1;
                }
            }
        }
    }

    Ok(stats)
}

/// A brand-new top-level node may be created by the first patch that targets
/// it. Deeper absent targets are left for the resolver to reject.
fn create_top_level_target(tree: &mut TreeValue, target: &Path) -> bool {
    let [Segment::Key(key)] = target.segments() else {
        return false;
    };
    match tree.as_map_mut() {
        Some(map) if !map.contains_key(key) => {
            debug!(target = %key, "Creating top-level node for patch target");
            map.insert(key.clone(), TreeValue::empty_map());
            true
        }
        _ => false,
    }
}

/// Names under which a change key refers to the target itself: a key-valued
/// final path segment and the node's own `id`. An index segment is not a
/// name, so `"0"` on a list target still means child 0. The root has none.
fn self_names(target: &Path, node: Option<&TreeValue>) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(last) = target.last() {
        if let Segment::Key(key) = last {
            names.push(key.clone());
        }
        if let Some(id) = node.and_then(TreeValue::id) {
            if !names.contains(&id) {
                names.push(id);
            }
        }
    }
    names
}

/// Change keys are immediate-child keys; dotted keys address deeper slots
/// relative to the target (`children.0`, `children.btn1`). Digit-only keys
/// are list indices when the target is a list and literal keys on a map.
fn change_key_path(key: &str) -> Result<Path, PathError> {
    Path::parse_relative(key)
}
