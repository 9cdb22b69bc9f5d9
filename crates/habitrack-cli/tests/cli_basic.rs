//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitrack"))
        .args(args)
        .env("HABITRACK_DATA_DIR", data_dir)
        .env_remove("HABITRACK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command {:?} failed: {}", args, stderr);
    stdout
}

fn habits_json(data_dir: &Path) -> Vec<serde_json::Value> {
    let out = run_cli_success(data_dir, &["habit", "view", "--json"]);
    serde_json::from_str(&out).expect("habit view --json is not JSON")
}

#[test]
fn test_habit_create_and_view() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(
        dir.path(),
        &["habit", "create", "--name", "Drink water", "--frequency", "daily"],
    );
    assert!(out.contains("Habit 'Drink water' added with frequency daily"));

    let habits = habits_json(dir.path());
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["name"], "Drink water");
    assert_eq!(habits[0]["frequency"], "daily");

    let text = run_cli_success(dir.path(), &["habit", "view"]);
    assert!(text.contains("Drink water - daily"));
    assert!(text.contains("Not completed yet"));
}

#[test]
fn test_habit_create_rejects_unknown_frequency() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["habit", "create", "--name", "Nap", "--frequency", "hourly"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("unsupported frequency"));
}

#[test]
fn test_habit_complete_twice_same_day() {
    let dir = TempDir::new().unwrap();
    run_cli_success(
        dir.path(),
        &["habit", "create", "--name", "Stretch", "--frequency", "daily"],
    );
    let id = habits_json(dir.path())[0]["id"].as_i64().unwrap().to_string();

    let out = run_cli_success(dir.path(), &["habit", "complete", "--id", &id]);
    assert!(out.contains("has been marked completed"));
    assert!(out.contains("1 day in a row"));

    let out = run_cli_success(dir.path(), &["habit", "complete", "--id", &id]);
    assert!(out.contains("already been completed for today"));
}

#[test]
fn test_habit_complete_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["habit", "complete", "--id", "99"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no habit with ID 99"));
}

#[test]
fn test_habit_delete() {
    let dir = TempDir::new().unwrap();
    run_cli_success(
        dir.path(),
        &["habit", "create", "--name", "Floss", "--frequency", "daily"],
    );
    let id = habits_json(dir.path())[0]["id"].as_i64().unwrap().to_string();

    let out = run_cli_success(dir.path(), &["habit", "delete", "--id", &id]);
    assert!(out.contains("deleted"));
    assert!(habits_json(dir.path()).is_empty());

    let (_, _, code) = run_cli(dir.path(), &["habit", "delete", "--id", &id]);
    assert_eq!(code, 1);
}

#[test]
fn test_example_activate_and_summary() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["example", "activate"]);
    assert!(out.contains("5 habits added"));

    let out = run_cli_success(dir.path(), &["analytics", "summary", "--json"]);
    let rows: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(rows.len(), 5);
    let walk = rows.iter().find(|r| r["name"] == "Morning walk").unwrap();
    assert_eq!(walk["streak"], 28);
    assert_eq!(walk["completions"], 28);

    let out = run_cli_success(dir.path(), &["analytics", "longest-streak"]);
    assert!(out.contains("Morning walk with 28 days"));

    let out = run_cli_success(dir.path(), &["example", "deactivate"]);
    assert!(out.contains("5 habits removed"));
    assert!(habits_json(dir.path()).is_empty());
}

#[test]
fn test_analytics_streak_by_name() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["example", "activate"]);

    let out = run_cli_success(dir.path(), &["analytics", "streak", "--name", "weekly"]);
    assert!(out.contains("Weekly reflection has a 4 weeks streak."));

    let out = run_cli_success(dir.path(), &["analytics", "streak", "--name", "review"]);
    assert!(out.contains("Multiple habits found"));

    let (_, stderr, code) = run_cli(dir.path(), &["analytics", "streak", "--name", "juggle"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_analytics_filter_and_plot() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["analytics", "plot"]);
    assert!(out.contains("No habits data is available."));

    run_cli_success(dir.path(), &["example", "activate"]);
    let out = run_cli_success(dir.path(), &["analytics", "filter", "--frequency", "daily"]);
    assert!(out.contains("Morning walk"));
    assert!(out.contains("Read a book"));
    assert!(!out.contains("Budget review"));

    let out = run_cli_success(dir.path(), &["analytics", "plot"]);
    assert!(out.contains("Habits completion vs current streak"));
}

#[test]
fn test_settings_set_and_show() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["settings", "set-time", "--time", "18:30"]);
    run_cli_success(dir.path(), &["settings", "set-frequency", "--frequency", "weekly"]);

    let out = run_cli_success(dir.path(), &["settings", "show"]);
    let settings: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(settings["notification_time"], "18:30");
    assert_eq!(settings["reminder_frequency"], "weekly");
    assert!(dir.path().join("settings.toml").exists());
}

#[test]
fn test_settings_rejects_bad_time() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["settings", "set-time", "--time", "25:61"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("HH:MM"));
}

#[test]
fn test_stop_reminder_without_pid_file() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["settings", "stop-reminder"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("is the reminder running?"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["completions", "bash"]);
    assert!(out.contains("habitrack"));
}

#[cfg(unix)]
#[test]
fn test_reminder_start_replaces_stale_pid_file_and_stops() {
    let dir = TempDir::new().unwrap();
    let pid_path = dir.path().join("reminder.pid");
    std::fs::write(&pid_path, "2147483646").unwrap();

    let out = run_cli_success(dir.path(), &["settings", "start-reminder"]);
    assert!(out.contains("Reminder started in background"));
    let pid = std::fs::read_to_string(&pid_path).unwrap();
    assert_ne!(pid.trim(), "2147483646");

    let (_, stderr, code) = run_cli(dir.path(), &["settings", "start-reminder"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("already running"));

    let out = run_cli_success(dir.path(), &["settings", "stop-reminder"]);
    assert!(out.contains(&format!("Reminder process {} stopped.", pid.trim())));
    assert!(!pid_path.exists());
}
