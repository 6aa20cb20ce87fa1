//! State Store
//!
//! Owns the authoritative UI tree and the instruction log. Every mutation
//! runs under one write lock: the batch is applied to a copy, the snapshot
//! (if any) is persisted, and only then is the copy swapped in. Readers take
//! the read lock and never see a half-applied batch.

pub mod defaults;
pub mod history;
pub mod persistence;

pub use defaults::default_tree;
pub use history::{HistoryEntry, UpdateMode};
pub use persistence::{SledSnapshotStore, Snapshot, SnapshotStore};

use crate::diff::{diff, ChangeRecord};
use crate::error::ApiError;
use crate::patch::{apply_batch, ApplyStats, PatchBatch};
use crate::tree::{hasher, TreeValue};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Receipt for a committed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub stats: ApplyStats,
}

/// Receipt for a committed replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceReceipt {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<ChangeRecord>,
}

/// Point-in-time summary of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub message_count: usize,
    pub next_sequence: u64,
    pub top_level_count: usize,
    pub digest: String,
    pub persistent: bool,
    pub supports_incremental: bool,
    pub supports_full: bool,
}

#[derive(Debug, Clone)]
struct StoreState {
    tree: TreeValue,
    log: Vec<HistoryEntry>,
    next_sequence: u64,
}

impl StoreState {
    fn initial(tree: TreeValue) -> Self {
        Self {
            tree,
            log: Vec::new(),
            next_sequence: 1,
        }
    }
}

/// The authoritative UI state.
pub struct StateStore {
    default_tree: TreeValue,
    inner: RwLock<StoreState>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
}

impl StateStore {
    /// In-memory store starting from `default_tree`.
    pub fn new(default_tree: TreeValue) -> Self {
        Self {
            inner: RwLock::new(StoreState::initial(default_tree.clone())),
            default_tree,
            snapshots: None,
        }
    }

    /// Store backed by `snapshots`. Resumes the persisted snapshot when one
    /// exists, otherwise starts from `default_tree`.
    pub fn open(
        default_tree: TreeValue,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Result<Self, ApiError> {
        let state = match snapshots.load()? {
            Some(snapshot) => {
                debug!(
                    entries = snapshot.log.len(),
                    next_sequence = snapshot.next_sequence,
                    "Resuming persisted UI state"
                );
                StoreState {
                    tree: snapshot.tree,
                    log: snapshot.log,
                    next_sequence: snapshot.next_sequence.max(1),
                }
            }
            None => {
                debug!("No persisted UI state, starting from default tree");
                StoreState::initial(default_tree.clone())
            }
        };
        Ok(Self {
            default_tree,
            inner: RwLock::new(state),
            snapshots: Some(snapshots),
        })
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_persistent(&self) -> bool {
        self.snapshots.is_some()
    }

    pub fn default_tree(&self) -> &TreeValue {
        &self.default_tree
    }

    /// Deep copy of the current tree.
    pub fn current(&self) -> TreeValue {
        self.inner.read().tree.clone()
    }

    /// Run `f` against the current tree under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&TreeValue) -> R) -> R {
        f(&self.inner.read().tree)
    }

    /// Apply `batch` atomically and log it under `instruction`.
    pub fn apply_batch(
        &self,
        instruction: &str,
        batch: &PatchBatch,
    ) -> Result<BatchReceipt, ApiError> {
        let mut state = self.inner.write();
        let outcome = apply_batch(&state.tree, batch)?;

        let entry = HistoryEntry {
            sequence: state.next_sequence,
            instruction: instruction.to_string(),
            timestamp: Utc::now(),
            mode: UpdateMode::Incremental,
            batch: Some(batch.clone()),
            changes: Vec::new(),
        };
        self.persist(&outcome.tree, state.next_sequence + 1, &entry)?;

        let receipt = BatchReceipt {
            sequence: entry.sequence,
            timestamp: entry.timestamp,
            stats: outcome.stats,
        };
        state.tree = outcome.tree;
        state.next_sequence += 1;
        state.log.push(entry);

        info!(
            sequence = receipt.sequence,
            patches = batch.len(),
            "Committed patch batch"
        );
        Ok(receipt)
    }

    /// Swap in `tree` wholesale and log the top-level changes.
    pub fn replace_all(
        &self,
        instruction: &str,
        tree: TreeValue,
    ) -> Result<ReplaceReceipt, ApiError> {
        validate_document(&tree)?;

        let mut state = self.inner.write();
        let changes = diff(&state.tree, &tree);
        let entry = HistoryEntry {
            sequence: state.next_sequence,
            instruction: instruction.to_string(),
            timestamp: Utc::now(),
            mode: UpdateMode::Full,
            batch: None,
            changes: changes.clone(),
        };
        self.persist(&tree, state.next_sequence + 1, &entry)?;

        let receipt = ReplaceReceipt {
            sequence: entry.sequence,
            timestamp: entry.timestamp,
            changes,
        };
        state.tree = tree;
        state.next_sequence += 1;
        state.log.push(entry);

        info!(
            sequence = receipt.sequence,
            changes = receipt.changes.len(),
            "Committed full replacement"
        );
        Ok(receipt)
    }

    /// Apply a batch but record the result as a full update carrying the
    /// top-level diff. Used when a full-mode request is answered with patches.
    pub fn apply_batch_as_full(
        &self,
        instruction: &str,
        batch: &PatchBatch,
    ) -> Result<ReplaceReceipt, ApiError> {
        let mut state = self.inner.write();
        let outcome = apply_batch(&state.tree, batch)?;
        let changes = diff(&state.tree, &outcome.tree);

        let entry = HistoryEntry {
            sequence: state.next_sequence,
            instruction: instruction.to_string(),
            timestamp: Utc::now(),
            mode: UpdateMode::Full,
            batch: Some(batch.clone()),
            changes: changes.clone(),
        };
        self.persist(&outcome.tree, state.next_sequence + 1, &entry)?;

        let receipt = ReplaceReceipt {
            sequence: entry.sequence,
            timestamp: entry.timestamp,
            changes,
        };
        state.tree = outcome.tree;
        state.next_sequence += 1;
        state.log.push(entry);
        Ok(receipt)
    }

    /// Restore the default tree, clear the log, restart the sequence at 1.
    pub fn reset(&self) -> Result<(), ApiError> {
        let mut state = self.inner.write();
        if let Some(snapshots) = &self.snapshots {
            snapshots.reset(&self.default_tree, 1)?;
        }
        let cleared = state.log.len();
        *state = StoreState::initial(self.default_tree.clone());
        info!(cleared_entries = cleared, "UI state reset to default");
        Ok(())
    }

    /// The last `limit` entries, oldest first.
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let state = self.inner.read();
        let start = state.log.len().saturating_sub(limit);
        state.log[start..].to_vec()
    }

    pub fn total_messages(&self) -> usize {
        self.inner.read().log.len()
    }

    pub fn status(&self) -> StoreStatus {
        let state = self.inner.read();
        StoreStatus {
            message_count: state.log.len(),
            next_sequence: state.next_sequence,
            top_level_count: state.tree.len(),
            digest: hasher::digest_hex(&state.tree),
            persistent: self.is_persistent(),
            supports_incremental: true,
            supports_full: true,
        }
    }

    fn persist(
        &self,
        tree: &TreeValue,
        next_sequence: u64,
        entry: &HistoryEntry,
    ) -> Result<(), ApiError> {
        if let Some(snapshots) = &self.snapshots {
            snapshots.commit(tree, next_sequence, entry)?;
        }
        Ok(())
    }
}

/// A full-tree document must be a map at the root.
pub fn validate_document(tree: &TreeValue) -> Result<(), ApiError> {
    let Some(map) = tree.as_map() else {
        return Err(ApiError::InvalidDocument(format!(
            "root must be a map, found {}",
            tree.type_name()
        )));
    };
    for field in ["id", "type"] {
        if !map.contains_key(field) {
            debug!(field, "Full-tree document has no root {} field", field);
        }
    }
    Ok(())
}
