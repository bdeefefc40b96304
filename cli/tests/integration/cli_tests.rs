//! Binary-level tests for argument parsing, parameter validation and exit
//! codes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPO: &str = "https://github.com/acme/demo-app.git";

fn dockhand() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dockhand"));
    cmd.env("NO_COLOR", "1")
        .env_remove("DOCKHAND_TOKEN")
        .env_remove("DOCKHAND_CONFIG");
    cmd
}

/// Non-interactive invocation with an isolated home and log directory.
fn batch(home: &TempDir) -> Command {
    let mut cmd = dockhand();
    cmd.env("HOME", home.path())
        .arg("--yes")
        .arg("--log-dir")
        .arg(home.path().join("logs"));
    cmd
}

fn valid_args() -> Vec<(&'static str, &'static str)> {
    vec![
        ("--repo", REPO),
        ("--token", "ghp_example"),
        ("--user", "ubuntu"),
        ("--host", "203.0.113.9"),
        ("--port", "3000"),
    ]
}

/// `valid_args` with `flag` replaced by `value`.
fn with_override(cmd: &mut Command, flag: &str, value: &str) {
    for (f, v) in valid_args() {
        cmd.arg(f).arg(if f == flag { value } else { v });
    }
}

// --- Help and version ---

#[test]
fn test_help_flag_shows_usage_and_cleanup() {
    dockhand()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--cleanup"))
        .stdout(predicate::str::contains("--repo"));
}

#[test]
fn test_version_flag_shows_version() {
    dockhand()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dockhand"));
}

#[test]
fn test_help_never_prints_token_from_env() {
    dockhand()
        .env("DOCKHAND_TOKEN", "ghp_hidden_value")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ghp_hidden_value").not());
}

#[test]
fn test_unknown_flag_is_a_usage_error() {
    dockhand().arg("--frobnicate").assert().code(2);
}

// --- Validation exit codes ---

#[test]
fn test_invalid_repo_url_exits_10() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--repo", "ftp://example.com/app.git");
    cmd.assert()
        .code(10)
        .stderr(predicate::str::contains("ftp://example.com/app.git"));
}

#[test]
fn test_empty_token_exits_11() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--token", "   ");
    cmd.assert().code(11);
}

#[test]
fn test_option_like_ssh_user_exits_12() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--user", "-oProxyCommand=sh");
    cmd.assert().code(12);
}

#[test]
fn test_out_of_range_octet_exits_13() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--host", "203.0.113.256");
    cmd.assert()
        .code(13)
        .stderr(predicate::str::contains("203.0.113.256"));
}

#[test]
fn test_port_zero_exits_14() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--port", "0");
    cmd.assert().code(14);
}

#[test]
fn test_token_is_never_echoed_on_failure() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--host", "not-an-ip");
    cmd.assert()
        .code(13)
        .stdout(predicate::str::contains("ghp_example").not())
        .stderr(predicate::str::contains("ghp_example").not());
}

// --- Missing values in non-interactive mode ---

#[test]
fn test_missing_host_without_prompts_exits_13() {
    let home = TempDir::new().unwrap();
    batch(&home)
        .args(["--repo", REPO, "--token", "ghp_example", "--user", "ubuntu"])
        .assert()
        .code(13)
        .stderr(predicate::str::contains("host"));
}

#[test]
fn test_missing_repo_without_prompts_exits_10() {
    let home = TempDir::new().unwrap();
    batch(&home).assert().code(10);
}

#[test]
fn test_token_read_from_env() {
    let home = TempDir::new().unwrap();
    // Token satisfied by the environment, so the first missing value is the user.
    batch(&home)
        .env("DOCKHAND_TOKEN", "ghp_example")
        .args(["--repo", REPO])
        .assert()
        .code(12);
}

#[test]
fn test_cleanup_does_not_require_token() {
    let home = TempDir::new().unwrap();
    // Missing host is reported, not the missing token.
    batch(&home)
        .args(["--cleanup", "--repo", REPO, "--user", "ubuntu"])
        .assert()
        .code(13);
}

// --- Configuration ---

#[test]
fn test_missing_explicit_config_file_fails() {
    let home = TempDir::new().unwrap();
    batch(&home)
        .arg("--config")
        .arg(home.path().join("absent.yaml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.yaml"));
}

#[test]
fn test_config_env_var_is_honoured() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("dockhand.yaml");
    std::fs::write(&config, "defaults:\n  branch: \"bad branch\"\n").unwrap();
    // The configured default branch is invalid, so validation fails on it.
    let mut cmd = batch(&home);
    cmd.env("DOCKHAND_CONFIG", &config);
    with_override(&mut cmd, "", "");
    cmd.assert().code(10);
}

#[test]
fn test_run_log_is_written() {
    let home = TempDir::new().unwrap();
    let mut cmd = batch(&home);
    with_override(&mut cmd, "--port", "0");
    cmd.assert().code(14);
    let logs: Vec<_> = std::fs::read_dir(home.path().join("logs"))
        .unwrap()
        .flatten()
        .collect();
    assert_eq!(logs.len(), 1, "expected one run log");
}
