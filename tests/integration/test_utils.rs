//! Shared fixtures for integration tests.

use serde_json::json;
use std::sync::Mutex;
use tempfile::TempDir;
use uitree::tree::TreeValue;

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Tree with a list container whose children carry ids.
pub fn list_tree() -> TreeValue {
    TreeValue::from(json!({
        "statusLabel": {"text": "ready", "color": "#333333"},
        "item2": {"text": "Item 2", "bgColor": "#f0f0f0"},
        "listContainer": {
            "id": "listContainer",
            "children": [
                {"id": "a", "text": "A"},
                {"id": "b", "text": "B"},
                {"id": "c", "text": "C"}
            ]
        }
    }))
}

/// Run `f` with `XDG_CONFIG_HOME` pointed at `test_dir` and the given
/// variables set, restoring everything afterwards.
pub fn with_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let mut names: Vec<&str> = vars.iter().map(|(name, _)| *name).collect();
    names.push("XDG_CONFIG_HOME");
    let saved: Vec<(String, Option<String>)> = names
        .iter()
        .map(|name| (name.to_string(), std::env::var(name).ok()))
        .collect();

    std::env::set_var("XDG_CONFIG_HOME", test_dir.path());
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let result = f();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }
    result
}
