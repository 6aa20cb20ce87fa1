//! Path resolution against a tree.
//!
//! Resolution walks every segment except the last as a strict read: missing
//! intermediate nodes are errors, never auto-created. The final segment is
//! located inside its container according to the requested [`Access`] and
//! returned as a [`Reference`] (container plus slot), so callers can read,
//! overwrite, append or remove through it.

use crate::error::PathError;
use crate::tree::path::{Path, Segment};
use crate::tree::value::TreeValue;

/// How the final slot is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The slot must exist.
    Read,
    /// The slot may be created: a new map key, or one past the end of a list.
    Upsert,
    /// A missing slot resolves to [`Slot::Vacant`].
    Delete,
}

/// Location of the addressed value inside its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The container itself is the addressed value.
    Root,
    /// Map key, present or insertable.
    Key(String),
    /// Existing list position.
    Index(usize),
    /// Existing list child found by its `id`. Overwrites keep that `id`.
    Child { index: usize, id: String },
    /// End of a list. When `id` is set the appended value must be a map,
    /// and it gets that `id` if it has none.
    Append { id: Option<String> },
    /// Nothing is there; removal is a no-op.
    Vacant,
}

/// Mutable handle to a slot inside the tree.
#[derive(Debug)]
pub struct Reference<'a> {
    container: &'a mut TreeValue,
    slot: Slot,
    path: String,
}

impl<'a> Reference<'a> {
    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn container(&self) -> &TreeValue {
        self.container
    }

    /// Current value at the slot, if any.
    pub fn get(&self) -> Option<&TreeValue> {
        match (&*self.container, &self.slot) {
            (container, Slot::Root) => Some(container),
            (TreeValue::Map(map), Slot::Key(key)) => map.get(key),
            (TreeValue::List(items), Slot::Index(i) | Slot::Child { index: i, .. }) => items.get(*i),
            _ => None,
        }
    }

    pub fn exists(&self) -> bool {
        self.get().is_some()
    }

    /// Consume the reference, yielding the value for in-place edits.
    pub fn into_mut(self) -> Option<&'a mut TreeValue> {
        match (self.container, self.slot) {
            (container, Slot::Root) => Some(container),
            (TreeValue::Map(map), Slot::Key(key)) => map.get_mut(&key),
            (TreeValue::List(items), Slot::Index(i) | Slot::Child { index: i, .. }) => {
                items.get_mut(i)
            }
            _ => None,
        }
    }

    /// Insert or overwrite. Returns the previous value.
    ///
    /// A value written under a list child id has to stay addressable by that
    /// id, so anything but a map carrying no `id` or the same `id` is a
    /// `TypeMismatch`.
    pub fn set(self, value: TreeValue) -> Result<Option<TreeValue>, PathError> {
        let previous = match (self.container, self.slot) {
            (container, Slot::Root) => Some(std::mem::replace(container, value)),
            (TreeValue::Map(map), Slot::Key(key)) => map.insert(key, value),
            (TreeValue::List(items), Slot::Index(i)) => items
                .get_mut(i)
                .map(|existing| std::mem::replace(existing, value)),
            (TreeValue::List(items), Slot::Child { index, id }) => {
                let value = with_child_id(value, Some(id), &self.path)?;
                items
                    .get_mut(index)
                    .map(|existing| std::mem::replace(existing, value))
            }
            (TreeValue::List(items), Slot::Append { id }) => {
                items.push(with_child_id(value, id, &self.path)?);
                None
            }
            _ => None,
        };
        Ok(previous)
    }

    /// Remove the slot from its container. The root cannot be removed.
    pub fn remove(self) -> Option<TreeValue> {
        match (self.container, self.slot) {
            (TreeValue::Map(map), Slot::Key(key)) => map.shift_remove(&key),
            (TreeValue::List(items), Slot::Index(i) | Slot::Child { index: i, .. })
                if i < items.len() =>
            {
                Some(items.remove(i))
            }
            _ => None,
        }
    }
}

fn with_child_id(
    mut value: TreeValue,
    id: Option<String>,
    path: &str,
) -> Result<TreeValue, PathError> {
    let Some(id) = id else {
        return Ok(value);
    };
    let own_id = value.id();
    match (&mut value, own_id) {
        (TreeValue::Map(map), None) => {
            map.insert("id".to_string(), TreeValue::string(id));
        }
        (TreeValue::Map(_), Some(own)) if own == id => {}
        (TreeValue::Map(_), Some(_)) => {
            return Err(PathError::TypeMismatch {
                path: path.to_string(),
                expected: "map whose id matches the key",
                found: "map",
            });
        }
        (other, _) => return Err(type_mismatch(path, "map", other)),
    }
    Ok(value)
}

fn type_mismatch(path: &str, expected: &'static str, found: &TreeValue) -> PathError {
    PathError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn position_by_id(items: &[TreeValue], id: &str) -> Option<usize> {
    items
        .iter()
        .position(|child| child.id().as_deref() == Some(id))
}

/// Find where `segment` lands inside `container`.
fn locate(
    container: &TreeValue,
    segment: &Segment,
    path: &str,
    access: Access,
) -> Result<Slot, PathError> {
    match container {
        TreeValue::Map(map) => {
            let key = segment.text();
            if map.contains_key(&key) {
                return Ok(Slot::Key(key));
            }
            match (access, segment) {
                (Access::Upsert, _) => Ok(Slot::Key(key)),
                (Access::Delete, _) => Ok(Slot::Vacant),
                (Access::Read, Segment::Index { .. }) => Err(type_mismatch(path, "list", container)),
                (Access::Read, Segment::Key(_)) => Err(PathError::PathNotFound {
                    path: path.to_string(),
                    segment: key,
                }),
            }
        }
        TreeValue::List(items) => match segment {
            Segment::Index { index, .. } => {
                let len = items.len();
                if *index < len {
                    Ok(Slot::Index(*index))
                } else if access == Access::Upsert && *index == len {
                    Ok(Slot::Append { id: None })
                } else if access == Access::Delete {
                    Ok(Slot::Vacant)
                } else {
                    Err(PathError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        len,
                    })
                }
            }
            Segment::Key(id) => match position_by_id(items, id) {
                Some(index) => Ok(Slot::Child {
                    index,
                    id: id.clone(),
                }),
                None => match access {
                    Access::Upsert => Ok(Slot::Append {
                        id: Some(id.clone()),
                    }),
                    Access::Delete => Ok(Slot::Vacant),
                    Access::Read => Err(PathError::ChildNotFound {
                        path: path.to_string(),
                        id: id.clone(),
                    }),
                },
            },
        },
        TreeValue::Scalar(_) => Err(type_mismatch(path, "map or list", container)),
    }
}

fn descend<'a>(
    node: &'a TreeValue,
    segment: &Segment,
    path: &str,
) -> Result<&'a TreeValue, PathError> {
    let found = match (node, locate(node, segment, path, Access::Read)?) {
        (TreeValue::Map(map), Slot::Key(key)) => map.get(&key),
        (TreeValue::List(items), Slot::Index(i) | Slot::Child { index: i, .. }) => items.get(i),
        _ => None,
    };
    found.ok_or_else(|| PathError::PathNotFound {
        path: path.to_string(),
        segment: segment.text(),
    })
}

fn descend_mut<'a>(
    node: &'a mut TreeValue,
    segment: &Segment,
    path: &str,
) -> Result<&'a mut TreeValue, PathError> {
    let slot = locate(node, segment, path, Access::Read)?;
    let found = match (node, slot) {
        (TreeValue::Map(map), Slot::Key(key)) => map.get_mut(&key),
        (TreeValue::List(items), Slot::Index(i) | Slot::Child { index: i, .. }) => {
            items.get_mut(i)
        }
        _ => None,
    };
    found.ok_or_else(|| PathError::PathNotFound {
        path: path.to_string(),
        segment: segment.text(),
    })
}

/// Read-only resolution: every segment must exist.
pub fn resolve<'a>(root: &'a TreeValue, path: &Path) -> Result<&'a TreeValue, PathError> {
    let mut current = root;
    for segment in path.segments() {
        current = descend(current, segment, path.as_str())?;
    }
    Ok(current)
}

/// Resolve `path` from the tree root to a mutable [`Reference`].
pub fn resolve_mut<'a>(
    root: &'a mut TreeValue,
    path: &Path,
    access: Access,
) -> Result<Reference<'a>, PathError> {
    resolve_segments_mut(root, path.segments(), path.as_str(), access)
}

/// Resolve raw segments starting at `node`. `display` is the path text used
/// in errors, so relative lookups can report the full address.
pub fn resolve_segments_mut<'a>(
    node: &'a mut TreeValue,
    segments: &[Segment],
    display: &str,
    access: Access,
) -> Result<Reference<'a>, PathError> {
    let Some((last, parents)) = segments.split_last() else {
        return Ok(Reference {
            container: node,
            slot: Slot::Root,
            path: display.to_string(),
        });
    };

    let mut current = node;
    for segment in parents {
        current = descend_mut(current, segment, display)?;
    }
    let slot = locate(current, last, display, access)?;
    Ok(Reference {
        container: current,
        slot,
        path: display.to_string(),
    })
}
