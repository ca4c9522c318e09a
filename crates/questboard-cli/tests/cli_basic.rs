//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "questboard-cli", "--"])
        .args(args)
        .env("QUESTBOARD_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Pull the created id out of a "Quest created: <id>" line.
fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Quest created: "))
        .expect("no 'Quest created:' line in output")
        .trim()
        .to_string()
}

#[test]
fn test_quest_create_and_get() {
    let title = format!("E2E one-off {}", std::process::id());
    let (stdout, _, code) = run_cli(&["quest", "create", &title, "--points", "15"]);
    assert_eq!(code, 0, "quest create failed");
    let id = created_id(&stdout);

    let (stdout, _, code) = run_cli(&["quest", "get", &id]);
    assert_eq!(code, 0, "quest get failed");
    assert!(stdout.contains(&title));

    run_cli(&["quest", "delete", &id]);
}

#[test]
fn test_quest_list() {
    let (_, _, code) = run_cli(&["quest", "list"]);
    assert_eq!(code, 0, "quest list failed");
}

#[test]
fn test_today_resolves_daily_quest() {
    let title = format!("E2E daily {}", std::process::id());
    let (stdout, _, code) = run_cli(&[
        "quest",
        "create",
        &title,
        "--recurrence",
        "daily",
        "--anchor",
        "2020-01-01",
    ]);
    assert_eq!(code, 0, "quest create failed");
    let id = created_id(&stdout);

    let (stdout, _, code) = run_cli(&["today"]);
    assert_eq!(code, 0, "today failed");
    assert!(stdout.contains(&title), "daily quest not due today");

    run_cli(&["quest", "delete", &id]);
}

#[test]
fn test_complete_uncomplete_round_trip() {
    let title = format!("E2E complete {}", std::process::id());
    let (stdout, _, code) = run_cli(&[
        "quest",
        "create",
        &title,
        "--recurrence",
        "daily",
        "--anchor",
        "2020-01-01",
        "--points",
        "5",
    ]);
    assert_eq!(code, 0, "quest create failed");
    let id = created_id(&stdout);

    let (stdout, stderr, code) = run_cli(&["complete", &id]);
    assert_eq!(code, 0, "complete failed: {stderr}");
    assert!(stdout.contains("Completed:"), "missing completion line");

    // Double-completion of the same occurrence must fail.
    let (_, _, code) = run_cli(&["complete", &id]);
    assert_ne!(code, 0, "double complete unexpectedly succeeded");

    let (_, _, code) = run_cli(&["uncomplete", &id]);
    assert_eq!(code, 0, "uncomplete failed");

    run_cli(&["quest", "delete", &id]);
}

#[test]
fn test_config_list() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    assert!(stdout.contains("profile"));
}

#[test]
fn test_member_add_and_list() {
    let name = format!("E2E member {}", std::process::id());
    let (stdout, _, code) = run_cli(&["member", "add", &name, "--nickname", "e2e"]);
    assert_eq!(code, 0, "member add failed");
    let id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Member added: "))
        .expect("no 'Member added:' line")
        .trim()
        .to_string();

    let (stdout, _, code) = run_cli(&["member", "list"]);
    assert_eq!(code, 0, "member list failed");
    assert!(stdout.contains(&name));

    run_cli(&["member", "remove", &id]);
}
