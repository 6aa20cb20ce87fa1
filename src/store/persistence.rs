//! Snapshot persistence for the state store.

use crate::error::StorageError;
use crate::store::history::HistoryEntry;
use crate::tree::TreeValue;
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;

const TREE_STATE: &str = "uitree_state";
const TREE_HISTORY: &str = "uitree_history";
const KEY_CURRENT: &[u8] = b"current";
const HISTORY_KEY_PAD: usize = 20;

/// Everything needed to rebuild a store after restart.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tree: TreeValue,
    pub log: Vec<HistoryEntry>,
    pub next_sequence: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    tree: TreeValue,
    next_sequence: u64,
}

/// Durable backing for a [`crate::store::StateStore`].
///
/// Implementations must make `commit` and `reset` all-or-nothing: the store
/// swaps in-memory state only after they return `Ok`.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Option<Snapshot>, StorageError>;

    /// Persist the new tree and counter, and append `appended` to the log.
    fn commit(
        &self,
        tree: &TreeValue,
        next_sequence: u64,
        appended: &HistoryEntry,
    ) -> Result<(), StorageError>;

    /// Persist `tree` as current and drop the whole log.
    fn reset(&self, tree: &TreeValue, next_sequence: u64) -> Result<(), StorageError>;
}

/// Sled-backed snapshot store. Values are JSON.
#[derive(Clone)]
pub struct SledSnapshotStore {
    db: Db,
    state: Tree,
    history: Tree,
}

impl SledSnapshotStore {
    /// Open (or create) a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = sled::open(path)
            .map_err(|e| StorageError::Backend(format!("Failed to open sled database: {}", e)))?;
        Self::new(db)
    }

    pub fn new(db: Db) -> Result<Self, StorageError> {
        let state = db.open_tree(TREE_STATE)?;
        let history = db.open_tree(TREE_HISTORY)?;
        Ok(Self { db, state, history })
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn encode_history_key(sequence: u64) -> String {
        encode_history_key(sequence)
    }

    fn read_log(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let mut out = Vec::new();
        for result in self.history.iter() {
            let (_, value) = result?;
            let entry: HistoryEntry = serde_json::from_slice(&value)?;
            out.push(entry);
        }
        out.sort_by_key(|e| e.sequence);
        Ok(out)
    }
}

impl SnapshotStore for SledSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let Some(raw) = self.state.get(KEY_CURRENT)? else {
            return Ok(None);
        };
        let record: StateRecord = serde_json::from_slice(&raw)?;
        Ok(Some(Snapshot {
            tree: record.tree,
            log: self.read_log()?,
            next_sequence: record.next_sequence,
        }))
    }

    fn commit(
        &self,
        tree: &TreeValue,
        next_sequence: u64,
        appended: &HistoryEntry,
    ) -> Result<(), StorageError> {
        let state = serde_json::to_vec(&StateRecord {
            tree: tree.clone(),
            next_sequence,
        })?;
        let entry = serde_json::to_vec(appended)?;
        let key = encode_history_key(appended.sequence);

        // State and log live in separate sled trees, so both go in one
        // transaction.
        (&self.state, &self.history)
            .transaction(|(state_tx, history_tx)| {
                state_tx.insert(KEY_CURRENT, state.as_slice())?;
                history_tx.insert(key.as_bytes(), entry.as_slice())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(transaction_error)?;
        self.flush()
    }

    fn reset(&self, tree: &TreeValue, next_sequence: u64) -> Result<(), StorageError> {
        let state = serde_json::to_vec(&StateRecord {
            tree: tree.clone(),
            next_sequence,
        })?;
        let keys = self
            .history
            .iter()
            .keys()
            .collect::<Result<Vec<_>, _>>()?;

        (&self.state, &self.history)
            .transaction(|(state_tx, history_tx)| {
                for key in &keys {
                    history_tx.remove(key.clone())?;
                }
                state_tx.insert(KEY_CURRENT, state.as_slice())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(transaction_error)?;
        self.flush()
    }
}

fn transaction_error(err: TransactionError<()>) -> StorageError {
    StorageError::Backend(format!("Snapshot transaction failed: {:?}", err))
}

fn encode_history_key(sequence: u64) -> String {
    format!("{:0width$}", sequence, width = HISTORY_KEY_PAD)
}
