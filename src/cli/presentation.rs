//! CLI presentation: text and json formatters per command.

use crate::api::{HistoryView, UpdateResponse};
use crate::diff::ChangeRecord;
use crate::error::{ApiError, StorageError};
use crate::store::{StoreStatus, UpdateMode};
use crate::tree::TreeValue;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

const INSTRUCTION_COLUMN_CHARS: usize = 40;
const DIGEST_PREFIX_CHARS: usize = 12;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::StorageError(StorageError::from(e)))
}

/// Section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_tree(tree: &TreeValue) -> Result<String, ApiError> {
    to_json(tree)
}

fn compact(value: &TreeValue) -> String {
    value
        .to_json_string()
        .unwrap_or_else(|_| "<unencodable>".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

/// Change records as a table; `(no changes)` when empty.
pub fn format_changes_text(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return "(no changes)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Target", "Old", "New"]);
    for change in changes {
        table.add_row(vec![
            change.target.clone(),
            compact(&change.old),
            compact(&change.new),
        ]);
    }
    table.to_string()
}

pub fn format_changes(changes: &[ChangeRecord], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        to_json(changes)
    } else {
        Ok(format_changes_text(changes))
    }
}

pub fn format_update_text(response: &UpdateResponse) -> String {
    let mut out = format!(
        "{} #{} ({}, via {})\n",
        "Applied".green().bold(),
        response.sequence,
        response.mode,
        response.source
    );
    if let Some(stats) = &response.stats {
        out.push_str(&format!(
            "  upserts: {}  deletes: {}  no-op deletes: {}  removed: {}  created: {}\n",
            stats.upserts,
            stats.deletes,
            stats.noop_deletes,
            stats.removed_targets,
            stats.created_targets
        ));
    }
    if let Some(batch) = &response.updates {
        out.push_str(&format!("  patches: {}\n", batch.len()));
        for target in batch.targets() {
            out.push_str(&format!("    - {}\n", target));
        }
    }
    if response.mode == UpdateMode::Full {
        out.push('\n');
        out.push_str(&format_changes_text(&response.changes));
        out.push('\n');
    }
    out
}

pub fn format_update(response: &UpdateResponse, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        to_json(response)
    } else {
        Ok(format_update_text(response))
    }
}

pub fn format_history_text(view: &HistoryView) -> String {
    if view.messages.is_empty() {
        return "No history yet.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Time", "Mode", "Changes", "Instruction"]);
    for entry in &view.messages {
        table.add_row(vec![
            entry.sequence.to_string(),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.mode.to_string(),
            entry.change_count().to_string(),
            truncate(&entry.instruction, INSTRUCTION_COLUMN_CHARS),
        ]);
    }
    format!(
        "{}\n\nShowing {} of {} message(s)",
        table,
        view.messages.len(),
        view.total_count
    )
}

pub fn format_history(view: &HistoryView, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        to_json(view)
    } else {
        Ok(format_history_text(view))
    }
}

fn yes_no(flag: bool) -> String {
    if flag {
        format!("{}", "yes".green())
    } else {
        format!("{}", "no".red())
    }
}

pub fn format_status_text(status: &StoreStatus) -> String {
    let digest: String = status.digest.chars().take(DIGEST_PREFIX_CHARS).collect();
    let mut out = format!("{}\n\n", format_section_heading("UI State"));
    out.push_str(&format!("  Top-level nodes: {}\n", status.top_level_count));
    out.push_str(&format!("  Digest: {}...\n", digest));
    out.push_str(&format!("  Messages: {}\n", status.message_count));
    out.push_str(&format!("  Next sequence: {}\n", status.next_sequence));
    out.push_str(&format!("  Persistent: {}\n\n", yes_no(status.persistent)));
    out.push_str(&format!("{}\n\n", format_section_heading("Capabilities")));
    out.push_str(&format!(
        "  Incremental updates: {}\n",
        yes_no(status.supports_incremental)
    ));
    out.push_str(&format!("  Full updates: {}\n", yes_no(status.supports_full)));
    out
}

pub fn format_status(status: &StoreStatus, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        to_json(status)
    } else {
        Ok(format_status_text(status))
    }
}
