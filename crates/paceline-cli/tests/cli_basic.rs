//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own temporary data directory
//! (PACELINE_HOME) and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_paceline"))
        .env("PACELINE_HOME", home)
        .env_remove("PACELINE_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{:?} failed: {}", args, stderr);
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_workout_list() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["workout", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("walk-run-20"));
    assert!(stdout.contains("tempo-30"));
}

#[test]
fn test_workout_show_unknown_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["workout", "show", "nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown workout"));
}

#[test]
fn test_scripted_run_with_skip() {
    let home = tempfile::tempdir().unwrap();
    let json = r#"{"id":"trio","name":"Trio","segments":[
        {"pace":"warmup","duration_secs":60},
        {"pace":"interval","duration_secs":90},
        {"pace":"cooldown","duration_secs":30}]}"#;
    let (_, stderr, code) = run_cli(home.path(), &["workout", "add", json]);
    assert_eq!(code, 0, "{}", stderr);

    let out = run_json(home.path(), &["timer", "start", "trio"]);
    assert_eq!(out["view"]["phase"], "running");
    assert_eq!(out["view"]["segment_count"], 3);

    // Skip is stamped with the real clock; the stored counters decide where it lands.
    let out = run_json(home.path(), &["timer", "skip"]);
    assert_eq!(out["view"]["segment_index"], 1);
    assert_eq!(out["view"]["elapsed_secs"], 60);
    assert_eq!(out["view"]["segment_elapsed_secs"], 0);

    let out = run_json(home.path(), &["timer", "pause"]);
    assert_eq!(out["view"]["phase"], "paused");

    let out = run_json(home.path(), &["timer", "end"]);
    assert_eq!(out["view"]["phase"], "idle");
}

#[test]
fn test_tick_with_explicit_timestamp_completes() {
    let home = tempfile::tempdir().unwrap();
    let json = r#"{"id":"short","name":"Short","segments":[{"pace":"sprint","duration_secs":5}]}"#;
    run_cli(home.path(), &["workout", "add", json]);
    run_json(home.path(), &["timer", "start", "short"]);

    let out = run_json(
        home.path(),
        &["timer", "tick", "--at", "99999999999999"],
    );
    assert_eq!(out["view"]["phase"], "completed");
    assert_eq!(out["view"]["elapsed_secs"], 5);
    let effects = out["effects"].as_array().unwrap();
    assert!(effects.iter().any(|e| e["type"] == "completed"));
}

#[test]
fn test_rejected_command_exits_nonzero() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["timer", "resume"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not paused"));
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.overflow_policy"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "cascade");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.overflow_policy", "discard"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.overflow_policy"]);
    assert_eq!(stdout.trim(), "discard");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.bogus", "1"]);
    assert_ne!(code, 0);
}

#[test]
fn test_workout_add_leaves_invalid_config_untouched() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("config.toml");
    let original = r#"log_level = "warn"

[[custom_workouts]]
id = "mine"
name = "Mine"

[[custom_workouts.segments]]
pace = "steady"
duration_secs = 60

[[custom_workouts]]
id = "broken"
name = "Broken"

[[custom_workouts.segments]]
pace = "easy"
duration_secs = 0
"#;
    std::fs::write(&path, original).unwrap();

    let json = r#"{"id":"new","name":"New","segments":[{"pace":"walk","duration_secs":30}]}"#;
    let (stdout, stderr, code) = run_cli(home.path(), &["workout", "add", json]);
    assert_ne!(code, 0, "add succeeded on an invalid config: {}", stdout);
    assert!(stderr.contains("custom_workouts.broken"), "{}", stderr);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);

    let (_, _, code) = run_cli(home.path(), &["workout", "remove", "mine"]);
    assert_ne!(code, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_start_after_overdue_run_completes_it_first() {
    let home = tempfile::tempdir().unwrap();
    let json = r#"{"id":"blip","name":"Blip","segments":[{"pace":"sprint","duration_secs":1}]}"#;
    let (_, stderr, code) = run_cli(home.path(), &["workout", "add", json]);
    assert_eq!(code, 0, "{}", stderr);
    run_json(home.path(), &["timer", "start", "blip"]);

    std::thread::sleep(std::time::Duration::from_millis(1_500));

    let out = run_json(home.path(), &["timer", "start", "blip"]);
    assert_eq!(out["view"]["phase"], "running");
    assert_eq!(out["view"]["elapsed_secs"], 0);
    let effects = out["effects"].as_array().unwrap();
    assert!(effects.iter().any(|e| e["type"] == "completed"));
}
