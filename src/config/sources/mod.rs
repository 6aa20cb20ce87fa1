//! Configuration sources, in increasing precedence.

pub mod env;
pub mod global_file;
pub mod workspace_file;
