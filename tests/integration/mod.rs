//! Integration tests for the UI tree state engine

mod batch_atomicity;
mod cli_commands;
mod diff_engine;
mod patch_protocol;
mod path_resolution;
mod persistence;
mod state_store;
mod test_utils;
