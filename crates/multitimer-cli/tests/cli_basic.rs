//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_multitimer"))
        .args(args)
        .env("MULTITIMER_DATA_DIR", dir.path())
        .env_remove("MULTITIMER_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn create(dir: &TempDir) -> String {
    run_json(dir, &["timer", "create"])["id"].to_string()
}

#[test]
fn test_timer_create_and_list() {
    let dir = TempDir::new().unwrap();
    let created = run_json(&dir, &["timer", "create"]);
    assert_eq!(created["title"], "Timer #1");
    assert_eq!(created["time"], "25:00");
    assert_eq!(created["running"], false);
    assert_eq!(created["phase_label"], "Focus Time");

    create(&dir);
    let list = run_json(&dir, &["timer", "list"]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1]["title"], "Timer #2");
}

#[test]
fn test_timer_edit_commands() {
    let dir = TempDir::new().unwrap();
    let id = create(&dir);

    let view = run_json(&dir, &["timer", "rename", &id, "  A very long title for a timer  "]);
    assert_eq!(view["title"], "A very long title fo");

    let view = run_json(&dir, &["timer", "duration", &id, "45"]);
    assert_eq!(view["time"], "45:00");

    let view = run_json(&dir, &["timer", "mode", &id, "stopwatch"]);
    assert_eq!(view["mode"], "countup");
    assert_eq!(view["time"], "00:00");

    let view = run_json(&dir, &["timer", "toggle", &id]);
    assert_eq!(view["running"], true);
    let view = run_json(&dir, &["timer", "pause", &id]);
    assert_eq!(view["running"], false);
}

#[test]
fn test_invalid_duration_is_rejected() {
    let dir = TempDir::new().unwrap();
    let id = create(&dir);
    for bad in ["0", "61", "abc", "-5"] {
        let (_, stderr, code) = run_cli(&dir, &["timer", "duration", &id, bad]);
        assert_eq!(code, 1, "{bad} accepted");
        assert!(stderr.starts_with("error:"), "{stderr}");
    }
    let view = run_json(&dir, &["timer", "status", &id]);
    assert_eq!(view["time"], "25:00");
}

#[test]
fn test_delete_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    let id = create(&dir);

    let (_, stderr, code) = run_cli(&dir, &["timer", "delete", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--yes"));

    run_json(&dir, &["timer", "delete", &id, "--yes"]);
    let list = run_json(&dir, &["timer", "list"]);
    assert!(list.as_array().unwrap().is_empty());

    let (_, _, code) = run_cli(&dir, &["timer", "status", &id]);
    assert_eq!(code, 1);
}

#[test]
fn test_theme_toggle_persists() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_json(&dir, &["theme", "get"])["theme"], "dark");
    assert_eq!(run_json(&dir, &["theme", "toggle"])["theme"], "light");
    assert_eq!(run_json(&dir, &["theme", "get"])["theme"], "light");

    let (_, _, code) = run_cli(&dir, &["theme", "set", "purple"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_default_duration_applies_to_new_timers() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["config", "set", "timer.default_duration_min", "30"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(&dir, &["config", "get", "timer.default_duration_min"]);
    assert_eq!(stdout.trim(), "30");

    let created = run_json(&dir, &["timer", "create"]);
    assert_eq!(created["time"], "30:00");

    let (_, _, code) = run_cli(&dir, &["config", "set", "timer.default_duration_min", "90"]);
    assert_eq!(code, 1);
}

#[test]
fn test_day_status_and_reset() {
    let dir = TempDir::new().unwrap();
    let id = create(&dir);
    run_json(&dir, &["timer", "start", &id]);

    let status = run_json(&dir, &["day", "status"]);
    assert!(status["next_reset_at"].is_string());
    assert!(status["zone"].as_str().unwrap().starts_with("UTC"));

    let after = run_json(&dir, &["day", "reset"]);
    let timers = after["timers"].as_array().unwrap();
    assert_eq!(timers[0]["running"], false);
    assert_eq!(timers[0]["sessions_completed"], 0);
}

#[test]
fn test_day_status_uses_configured_offset() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&dir, &["config", "set", "daily_reset.utc_offset_minutes", "540"]);
    assert_eq!(code, 0);
    assert_eq!(run_json(&dir, &["day", "status"])["zone"], "UTC+09:00");

    let (stdout, stderr, code) =
        run_cli(&dir, &["config", "set", "daily_reset.utc_offset_minutes", "none"]);
    assert_eq!(code, 0, "{stderr}");
    assert_eq!(stdout.trim(), "ok");
    let (stdout, _, _) = run_cli(&dir, &["config", "get", "daily_reset.utc_offset_minutes"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_watch_help_warns_about_concurrent_edits() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["watch", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("overwritten"), "{stdout}");
}

#[test]
fn test_watch_ticks_running_stopwatch() {
    let dir = TempDir::new().unwrap();
    let id = create(&dir);
    run_json(&dir, &["timer", "mode", &id, "countup"]);
    run_json(&dir, &["timer", "start", &id]);

    let (stdout, stderr, code) = run_cli(&dir, &["watch", "--seconds", "2"]);
    assert_eq!(code, 0, "{stderr}");
    let ticked = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .any(|v| v["type"] == "TimerChanged" && v["change"] == "ticked");
    assert!(ticked, "no tick events in: {stdout}");

    let view = run_json(&dir, &["timer", "status", &id]);
    assert_ne!(view["time"], "00:00");
    assert_eq!(view["running"], true);
}
