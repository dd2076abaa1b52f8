//! Integration tests for the depwalk CLI.
//!
//! These tests run the compiled binary against fixture files.

use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

mod common;
use common::run_depwalk_in_dir;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a temporary directory holding `libraries.jsonl`
#[fixture]
fn data_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    fs::write(
        temp.path().join("libraries.jsonl"),
        concat!(
            r#"{"id":"flask","pk":"f","name":"flask","dependencies":[{"id":"click","pk":"c"},{"id":"ghost","pk":"g"}]}"#,
            "\n",
            r#"{"id":"click","pk":"c","name":"click","dependencies":[{"id":"colorama","pk":"c"}]}"#,
            "\n",
            r#"{"id":"colorama","pk":"c","name":"colorama"}"#,
            "\n",
        ),
    )
    .expect("Failed to write fixture");
    temp
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[rstest]
fn test_cli_help(data_dir: TempDir) {
    let output = run_depwalk_in_dir(data_dir.path(), &["--help"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("depwalk"));
    assert!(text.contains("traverse"));
}

#[rstest]
fn test_cli_version(data_dir: TempDir) {
    let output = run_depwalk_in_dir(data_dir.path(), &["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Command Tests
// ============================================================================

#[rstest]
fn test_traverse_text(data_dir: TempDir) {
    let output = run_depwalk_in_dir(
        data_dir.path(),
        &["--data-file", "libraries.jsonl", "traverse", "flask", "2"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("Level 0\n  flask [pk f]"));
    assert!(text.contains("Level 2\n  colorama [pk c]"));
    assert!(text.contains("Missing (1)\n  ghost [pk g] at level 1"));
}

#[rstest]
fn test_traverse_json(data_dir: TempDir) {
    let output = run_depwalk_in_dir(
        data_dir.path(),
        &["--json", "--data-file", "libraries.jsonl", "traverse", "flask", "1"],
    );

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["root_name"], "flask");
    assert_eq!(value["collected_nodes"]["click"]["depth"], 1);
    assert!(value["collected_nodes"].get("colorama").is_none());
    assert_eq!(value["outcome"]["status"], "completed");
}

#[rstest]
fn test_traverse_negative_depth_fails(data_dir: TempDir) {
    let output = run_depwalk_in_dir(
        data_dir.path(),
        &["--data-file", "libraries.jsonl", "traverse", "flask", "-1"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("depth must be zero or greater"));
}

#[rstest]
fn test_data_file_from_config(data_dir: TempDir) {
    fs::write(
        data_dir.path().join("depwalk.yaml"),
        "store:\n  data-file: libraries.jsonl\n",
    )
    .unwrap();

    let output = run_depwalk_in_dir(data_dir.path(), &["--json", "count"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["count"], 3);
}

#[rstest]
fn test_strict_config_rejects_malformed_line(data_dir: TempDir) {
    fs::write(data_dir.path().join("broken.jsonl"), "{\"id\":\"a\",\"pk\":\"a\"}\n{oops\n").unwrap();
    fs::write(
        data_dir.path().join("depwalk.yaml"),
        "store:\n  data-file: broken.jsonl\n  strict: true\n",
    )
    .unwrap();

    let output = run_depwalk_in_dir(data_dir.path(), &["count"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[rstest]
fn test_missing_data_file_fails(data_dir: TempDir) {
    let output = run_depwalk_in_dir(data_dir.path(), &["count"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no data file configured"));
}

#[rstest]
fn test_point_read_and_find(data_dir: TempDir) {
    let read = run_depwalk_in_dir(
        data_dir.path(),
        &["--data-file", "libraries.jsonl", "point-read", "click", "c"],
    );
    assert!(read.status.success());
    assert!(stdout(&read).contains("dependencies (1):\n  colorama [pk c]"));

    let find = run_depwalk_in_dir(
        data_dir.path(),
        &["--json", "--data-file", "libraries.jsonl", "find", "nope"],
    );
    assert!(find.status.success());
    assert_eq!(stdout(&find).trim(), "null");
}

#[rstest]
fn test_env_lists_variables(data_dir: TempDir) {
    let output = run_depwalk_in_dir(data_dir.path(), &["env"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("DEPWALK_DATA_FILE = (unset)"));
    assert!(text.contains("DEPWALK_TIMEOUT_SECS"));
}
