//! CLI domain: parse, route, help, output, and presentation only.
//! No state logic; a single route table dispatches to the state API.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, is_mutating, needs_store};
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_changes, format_changes_text, format_history, format_history_text,
    format_section_heading, format_status, format_status_text, format_tree, format_update,
    format_update_text,
};
pub use route::{read_input, RunContext};
