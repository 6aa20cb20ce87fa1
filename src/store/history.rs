//! Instruction log entries.

use crate::diff::ChangeRecord;
use crate::patch::PatchBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an instruction changed the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Patch batch against the current tree
    Incremental,
    /// Whole-tree replacement
    Full,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Incremental => "incremental",
            UpdateMode::Full => "full",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" | "patch" => Ok(UpdateMode::Incremental),
            "full" | "replace" => Ok(UpdateMode::Full),
            other => Err(format!(
                "Unknown update mode '{}': expected incremental or full",
                other
            )),
        }
    }
}

/// One submitted instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Starts at 1; restarts at 1 after a reset
    pub sequence: u64,
    pub instruction: String,
    pub timestamp: DateTime<Utc>,
    pub mode: UpdateMode,
    /// Applied batch, for incremental entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<PatchBatch>,
    /// Top-level changes, for full entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ChangeRecord>,
}

impl HistoryEntry {
    /// Number of patches or change records carried by the entry.
    pub fn change_count(&self) -> usize {
        match self.mode {
            UpdateMode::Incremental => self.batch.as_ref().map(PatchBatch::len).unwrap_or(0),
            UpdateMode::Full => self.changes.len(),
        }
    }

    /// Timestamp in RFC 3339 form, as shown to users.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339()
    }
}
