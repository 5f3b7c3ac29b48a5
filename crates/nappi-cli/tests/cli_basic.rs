//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! runs against its own HOME so nothing leaks between tests or into the
//! real config directory. Only offline commands are exercised here;
//! network-backed commands are covered by the core integration tests.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with HOME pointed at `home` and return output.
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "nappi-cli", "--"])
        .args(args)
        .env("HOME", home)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["--help"]);
    assert_eq!(code, 0, "Help failed");
    assert!(stdout.contains("alerts"));
    assert!(stdout.contains("stream"));
    assert!(stdout.contains("sleep"));
    assert!(stdout.contains("push"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["frobnicate"]);
    assert_ne!(code, 0, "Unknown subcommand should fail");
}

#[test]
fn test_config_path() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0, "Config path failed");
    assert!(stdout.contains("config.toml"));
}

#[test]
fn test_config_show_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0, "Config show failed");
    assert!(stdout.contains("base_url"));
    assert!(stdout.contains("http://localhost:8000"));
}

#[test]
fn test_config_init_then_init_again_fails() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "init"]);
    assert_eq!(code, 0, "Config init failed");
    assert!(stdout.contains("config.toml"));

    let (_, stderr, code) = run_cli(home.path(), &["config", "init"]);
    assert_ne!(code, 0, "Second init should fail");
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_config_set_session_persists() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set-session", "--owner-id", "42", "--subject-id", "7"],
    );
    assert_eq!(code, 0, "Set session failed");

    let (stdout, _, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0, "Config show failed");
    assert!(stdout.contains("owner_id = 42"));
    assert!(stdout.contains("subject_id = 7"));
}

#[test]
fn test_alerts_without_session_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["alerts", "unread-count"]);
    assert_ne!(code, 0, "Command without a session should fail");
    assert!(stderr.contains("owner_id") || stderr.contains("error"));
}

#[test]
fn test_sleep_intervene_rejects_unknown_action() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["sleep", "intervene", "snooze"]);
    assert_ne!(code, 0, "Unknown intervention action should fail");
}
