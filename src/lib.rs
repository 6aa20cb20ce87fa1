//! uitree: Server-side UI Tree State
//!
//! Keeps a JSON-like UI tree and changes it either wholesale (replace the
//! whole tree) or incrementally through batches of path-addressed patches.
//! Batches are atomic, `null` deletes, and full replacements report a
//! one-level diff of what changed.

pub mod api;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod generator;
pub mod logging;
pub mod patch;
pub mod provider;
pub mod store;
pub mod tree;
