//! CLI parse: clap types for uitree. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// uitree CLI - server-side UI tree state
#[derive(Parser)]
#[command(name = "uitree")]
#[command(about = "Maintain a UI tree and change it with path-addressed patches")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (info level unless --log-level is given)
    #[arg(long, short = 'v', default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the current tree, or the value at a path
    State {
        /// Dotted path, e.g. `item1.text` or `panel.children.0`
        #[arg(long)]
        path: Option<String>,
    },
    /// Turn an instruction into an update via the configured generator
    Send {
        /// Free-text instruction
        instruction: String,
        /// Update mode (incremental or full)
        #[arg(long, default_value = "incremental")]
        mode: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Apply a patch or patch batch directly
    Patch {
        /// JSON text, or @file to read it from a file
        input: String,
        /// Message recorded in the history
        #[arg(long, default_value = "direct patch")]
        message: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Replace the whole tree
    Replace {
        /// JSON text, or @file to read it from a file
        input: String,
        /// Message recorded in the history
        #[arg(long, default_value = "direct replace")]
        message: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the top-level changes between two trees (no state involved)
    Diff {
        /// Old tree: JSON text or @file
        old: String,
        /// New tree: JSON text or @file
        new: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show recent instructions
    History {
        /// Number of most recent entries
        #[arg(long)]
        limit: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Restore the default tree and clear the history
    Reset,
    /// Show store status
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
