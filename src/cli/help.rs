//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log fields (e.g. "send", "history").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::State { .. } => "state",
        Commands::Send { .. } => "send",
        Commands::Patch { .. } => "patch",
        Commands::Replace { .. } => "replace",
        Commands::Diff { .. } => "diff",
        Commands::History { .. } => "history",
        Commands::Reset => "reset",
        Commands::Status { .. } => "status",
    }
}

/// Whether the command changes the stored state.
pub fn is_mutating(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Send { .. } | Commands::Patch { .. } | Commands::Replace { .. } | Commands::Reset
    )
}

/// Whether the command needs the state store at all.
pub fn needs_store(command: &Commands) -> bool {
    !matches!(command, Commands::Diff { .. })
}
