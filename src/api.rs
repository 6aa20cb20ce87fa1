//! UI State API
//!
//! Request orchestration over a [`StateStore`] and an [`UpdateGenerator`].
//! Instruction-driven requests call the generator first, outside any store
//! lock, and then commit its output in one locked step.

use crate::diff::ChangeRecord;
use crate::error::ApiError;
use crate::generator::{GenerationRequest, GeneratorOutput, UpdateGenerator};
use crate::patch::{ApplyStats, PatchBatch};
use crate::store::{HistoryEntry, StateStore, StoreStatus, UpdateMode};
use crate::tree::{resolve, Path, TreeValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of any committed update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    /// Mode the update was recorded under
    pub mode: UpdateMode,
    /// Generator name, or `direct` for caller-supplied patches and trees
    pub source: String,
    /// Applied batch, when the update was a batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<PatchBatch>,
    /// Top-level changes, for full updates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ChangeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ApplyStats>,
}

/// A window of the instruction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    pub messages: Vec<HistoryEntry>,
    pub total_count: usize,
}

pub const DIRECT_SOURCE: &str = "direct";

/// UI state service.
pub struct UiStateApi {
    store: Arc<StateStore>,
    generator: Arc<dyn UpdateGenerator>,
}

impl UiStateApi {
    pub fn new(store: Arc<StateStore>, generator: Arc<dyn UpdateGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn generator(&self) -> &Arc<dyn UpdateGenerator> {
        &self.generator
    }

    /// Instruction answered with a patch batch.
    pub async fn submit_incremental(&self, instruction: &str) -> Result<UpdateResponse, ApiError> {
        self.submit(instruction, UpdateMode::Incremental).await
    }

    /// Instruction answered with a whole tree.
    pub async fn submit_full(&self, instruction: &str) -> Result<UpdateResponse, ApiError> {
        self.submit(instruction, UpdateMode::Full).await
    }

    /// Run the generator for `instruction` and commit what it returns.
    ///
    /// A generator may answer in the other mode's shape: a batch in full
    /// mode is applied and reported with its top-level diff, and a tree in
    /// incremental mode replaces the current tree. A well-formed batch whose
    /// targets do not resolve is rejected with its path error, like a direct
    /// patch; only generation failures fall back to the rules.
    pub async fn submit(
        &self,
        instruction: &str,
        mode: UpdateMode,
    ) -> Result<UpdateResponse, ApiError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ApiError::EmptyInstruction);
        }

        let request = GenerationRequest::new(instruction, self.store.current(), mode);
        let generated = self.generator.generate(&request).await?;
        debug!(
            mode = %mode,
            source = %generated.source,
            output = generated.output.kind(),
            "Generator answered"
        );

        let source = generated.source;
        match (mode, generated.output) {
            (UpdateMode::Incremental, GeneratorOutput::Batch(batch)) => {
                let receipt = self.store.apply_batch(instruction, &batch)?;
                Ok(UpdateResponse {
                    sequence: receipt.sequence,
                    timestamp: receipt.timestamp,
                    mode,
                    source,
                    updates: Some(batch),
                    changes: Vec::new(),
                    stats: Some(receipt.stats),
                })
            }
            (UpdateMode::Full, GeneratorOutput::Batch(batch)) => {
                let receipt = self.store.apply_batch_as_full(instruction, &batch)?;
                Ok(UpdateResponse {
                    sequence: receipt.sequence,
                    timestamp: receipt.timestamp,
                    mode,
                    source,
                    updates: Some(batch),
                    changes: receipt.changes,
                    stats: None,
                })
            }
            (_, GeneratorOutput::Tree(tree)) => {
                let receipt = self.store.replace_all(instruction, tree)?;
                Ok(UpdateResponse {
                    sequence: receipt.sequence,
                    timestamp: receipt.timestamp,
                    mode: UpdateMode::Full,
                    source,
                    updates: None,
                    changes: receipt.changes,
                    stats: None,
                })
            }
        }
    }

    /// Apply a caller-supplied batch.
    pub fn apply_patches(
        &self,
        message: &str,
        batch: &PatchBatch,
    ) -> Result<UpdateResponse, ApiError> {
        let receipt = self.store.apply_batch(message, batch)?;
        Ok(UpdateResponse {
            sequence: receipt.sequence,
            timestamp: receipt.timestamp,
            mode: UpdateMode::Incremental,
            source: DIRECT_SOURCE.to_string(),
            updates: Some(batch.clone()),
            changes: Vec::new(),
            stats: Some(receipt.stats),
        })
    }

    /// Replace the tree with a caller-supplied document.
    pub fn replace_tree(&self, message: &str, tree: TreeValue) -> Result<UpdateResponse, ApiError> {
        let receipt = self.store.replace_all(message, tree)?;
        Ok(UpdateResponse {
            sequence: receipt.sequence,
            timestamp: receipt.timestamp,
            mode: UpdateMode::Full,
            source: DIRECT_SOURCE.to_string(),
            updates: None,
            changes: receipt.changes,
            stats: None,
        })
    }

    pub fn state(&self) -> TreeValue {
        self.store.current()
    }

    /// Value at `path` in the current tree.
    pub fn state_at(&self, path: &str) -> Result<TreeValue, ApiError> {
        let path = Path::parse(path)?;
        self.store
            .read(|tree| resolve(tree, &path).cloned())
            .map_err(ApiError::from)
    }

    pub fn history(&self, limit: usize) -> HistoryView {
        HistoryView {
            messages: self.store.history(limit),
            total_count: self.store.total_messages(),
        }
    }

    pub fn reset(&self) -> Result<(), ApiError> {
        self.store.reset()?;
        info!("State reset to initial values");
        Ok(())
    }

    pub fn status(&self) -> StoreStatus {
        self.store.status()
    }
}
