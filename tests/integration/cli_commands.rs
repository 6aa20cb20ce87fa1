//! CLI parsing and routing against a temporary workspace.

use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;
use uitree::cli::{map_error, Cli, Commands, RunContext};
use uitree::config::UiTreeConfig;

fn persisted_context(workspace: &TempDir) -> RunContext {
    let config = UiTreeConfig::default();
    RunContext::with_config(workspace.path().to_path_buf(), config).unwrap()
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["uitree"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_parse_global_flags_and_subcommand() {
    let cli = parse(&["--workspace", "/tmp/ws", "--log-level", "debug", "history", "--limit", "5"]);
    assert_eq!(cli.workspace, PathBuf::from("/tmp/ws"));
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    match cli.command {
        Commands::History { limit, format } => {
            assert_eq!(limit, Some(5));
            assert_eq!(format, "text");
        }
        _ => panic!("expected history"),
    }
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["uitree", "--verbose", "--quiet", "status"]).is_err());
}

#[test]
fn test_patch_history_reset_round() {
    let workspace = TempDir::new().unwrap();
    let ctx = persisted_context(&workspace);

    let out = ctx
        .execute(&parse(&["patch", r#"{"target":"statusLabel","change":{"text":"cli"}}"#]).command)
        .unwrap();
    assert!(out.contains("#1"));
    assert!(workspace.path().join(".uitree").join("store").exists());

    let state = ctx
        .execute(&parse(&["state", "--path", "statusLabel.text"]).command)
        .unwrap();
    assert_eq!(state, "\"cli\"");

    let history = ctx
        .execute(&parse(&["history", "--format", "json"]).command)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(value["total_count"], 1);
    assert_eq!(value["messages"][0]["instruction"], "direct patch");

    ctx.execute(&parse(&["reset"]).command).unwrap();
    let status = ctx
        .execute(&parse(&["status", "--format", "json"]).command)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(value["message_count"], 0);
    assert_eq!(value["next_sequence"], 1);
    assert_eq!(value["persistent"], true);
}

#[test]
fn test_replace_from_file_prints_changes() {
    let workspace = TempDir::new().unwrap();
    let ctx = persisted_context(&workspace);
    let doc = workspace.path().join("tree.json");
    std::fs::write(
        &doc,
        r##"{"statusLabel":{"text":"ready","color":"#333333"},"item1":{"text":"One","bgColor":"#f0f0f0"}}"##,
    )
    .unwrap();

    let input = format!("@{}", doc.display());
    let out = ctx
        .execute(&parse(&["replace", input.as_str(), "--format", "json"]).command)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["mode"], "full");
    assert_eq!(value["changes"].as_array().unwrap().len(), 1);
    assert_eq!(value["changes"][0]["target"], "item1");
}

#[test]
fn test_send_full_mode_text_output() {
    let workspace = TempDir::new().unwrap();
    let ctx = persisted_context(&workspace);
    let out = ctx
        .execute(&parse(&["send", "batch everything", "--mode", "full"]).command)
        .unwrap();
    assert!(out.contains("via rules"));
    assert!(out.contains("statusLabel"));
}

#[test]
fn test_rejected_patch_maps_to_kind() {
    let workspace = TempDir::new().unwrap();
    let ctx = persisted_context(&workspace);
    let err = ctx
        .execute(&parse(&["patch", r#"[{"target":"item1.nope.deeper","change":{"a":1}}]"#]).command)
        .unwrap_err();
    assert!(map_error(&err).starts_with("error[PathNotFound]"));

    let err = ctx
        .execute(&parse(&["patch", "not json"]).command)
        .unwrap_err();
    assert!(map_error(&err).starts_with("error[InvalidDocument]"));
}

#[test]
fn test_offline_diff_text() {
    let workspace = TempDir::new().unwrap();
    let ctx = persisted_context(&workspace);
    let out = ctx
        .execute(&parse(&["diff", r#"{"a":1,"b":2}"#, r#"{"a":1,"b":3}"#]).command)
        .unwrap();
    assert!(out.contains('b'));
    assert!(!workspace.path().join(".uitree").exists());
}
