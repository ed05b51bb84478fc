//! Integration tests for CLI output behavior
//!
//! The default behavior is quiet (no logs). Use -v/--verbose to enable logs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

/// Run perch in `dir` with HOME pointed there, so no real user config leaks in.
fn run_perch(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_perch"))
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .env_remove("PERCH_LOG_LEVEL")
        .args(args)
        .output()
        .expect("Failed to execute perch")
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = run_perch(dir, args);
    assert!(
        output.status.success(),
        "perch {:?} failed with exit code {:?}. stderr: {}",
        args,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document")
}

#[test]
fn test_simulate_places_popup_below_trigger() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report = run_json(
        temp_dir.path(),
        &[
            "simulate",
            "--json",
            "--settle-ms",
            "20",
            "--anchor",
            "100,50,1280,800",
            "--offset",
            "10,20,30,20",
            "--content",
            "320,240",
        ],
    );

    let bounds = &report["settled"]["bounds"];
    assert_eq!(bounds["x"], 110);
    assert_eq!(bounds["y"], 70);
    assert_eq!(bounds["width"], 320);
    assert_eq!(bounds["height"], 240);
    assert_eq!(report["settled"]["shown"], true);
    assert_eq!(report["closed_by"], "owner");
    assert_eq!(report["final_status"]["destroyed"], true);
}

#[test]
fn test_simulate_clamps_oversized_content() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report = run_json(
        temp_dir.path(),
        &["simulate", "--json", "--settle-ms", "20", "--content", "900,10"],
    );

    assert_eq!(report["settled"]["bounds"]["width"], 800);
    assert_eq!(report["settled"]["bounds"]["height"], 25);
}

#[test]
fn test_simulate_live_size_wins() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report = run_json(
        temp_dir.path(),
        &[
            "simulate",
            "--json",
            "--settle-ms",
            "20",
            "--content",
            "500,500",
            "--live",
            "300,200",
        ],
    );

    assert_eq!(report["settled"]["live_sizing"], true);
    assert_eq!(report["settled"]["bounds"]["width"], 300);
    assert_eq!(report["settled"]["bounds"]["height"], 200);
}

#[test]
fn test_simulate_load_check_closes_empty_popup() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report = run_json(
        temp_dir.path(),
        &[
            "simulate",
            "--json",
            "--settle-ms",
            "20",
            "--trigger",
            "load-check",
            "--empty",
        ],
    );

    assert_eq!(report["trigger"], "load-check");
    assert_eq!(report["settled"]["shown"], false);
    assert_eq!(report["closed_by"], "empty_content");
}

#[test]
fn test_simulate_blur_closes_popup() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report = run_json(
        temp_dir.path(),
        &["simulate", "--json", "--settle-ms", "20", "--blur"],
    );
    assert_eq!(report["closed_by"], "blur");
}

#[test]
fn test_simulate_blur_with_focus_outside_keeps_popup() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let report = run_json(
        temp_dir.path(),
        &[
            "simulate",
            "--json",
            "--settle-ms",
            "20",
            "--blur",
            "--focus-outside",
        ],
    );
    assert_eq!(report["closed_by"], "owner");
}

#[test]
fn test_simulate_rejects_excessive_settle_delay() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_perch(temp_dir.path(), &["simulate", "--settle-ms", "60000"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid simulation settings"),
        "Expected validation message in stderr, got: {}",
        stderr
    );
}

/// Verify that stdout contains only user-facing output (no JSON logs)
/// and that stderr has no INFO logs by default (quiet mode)
#[test]
fn test_simulate_stdout_is_clean() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_perch(temp_dir.path(), &["simulate", "--settle-ms", "20"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        !stdout.contains(r#""event":"#),
        "stdout should not contain JSON logs, got: {}",
        stdout
    );
    assert!(stdout.contains("Bounds:"), "got: {}", stdout);
    assert!(
        stdout.contains("Final:") && stdout.contains("destroyed yes"),
        "text output should report the final status, got: {}",
        stdout
    );
    assert!(
        !stderr.contains(r#""level":"INFO""#),
        "Default mode should not emit INFO logs, got: {}",
        stderr
    );
}

#[test]
fn test_verbose_flag_emits_popup_events() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_perch(temp_dir.path(), &["-v", "simulate", "--settle-ms", "20"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("core.popup.create_started"),
        "Verbose mode should emit popup events, got: {}",
        stderr
    );
    assert!(
        stderr.contains("core.app.startup_completed"),
        "Verbose mode should emit the startup event, got: {}",
        stderr
    );
}

#[test]
fn test_log_level_env_controls_verbose_output() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let default_level = run_perch(temp_dir.path(), &["-v", "simulate", "--settle-ms", "20"]);
    let stderr = String::from_utf8_lossy(&default_level.stderr);
    assert!(
        !stderr.contains("core.popup.task_spawned"),
        "info level should hide debug events, got: {}",
        stderr
    );

    let debug_level = Command::new(env!("CARGO_BIN_EXE_perch"))
        .current_dir(temp_dir.path())
        .env("HOME", temp_dir.path())
        .env_remove("RUST_LOG")
        .env("PERCH_LOG_LEVEL", "debug")
        .args(["-v", "simulate", "--settle-ms", "20"])
        .output()
        .expect("Failed to execute perch");
    assert!(debug_level.status.success());
    let stderr = String::from_utf8_lossy(&debug_level.stderr);
    assert!(
        stderr.contains("core.popup.task_spawned"),
        "PERCH_LOG_LEVEL=debug should emit debug events, got: {}",
        stderr
    );
}

#[test]
fn test_config_reads_project_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_dir = temp_dir.path().join(".perch");
    fs::create_dir_all(&config_dir).expect("Failed to create .perch dir");
    fs::write(
        config_dir.join("config.toml"),
        r#"
[sizing]
settle_delay_ms = 350
strategy = "root-bounding-box"

[content]
trigger = "load-check"
"#,
    )
    .expect("Failed to write config");

    let report = run_json(temp_dir.path(), &["config", "--json"]);
    assert_eq!(report["sizing"]["settle_delay_ms"], 350);
    assert_eq!(report["sizing"]["strategy"], "root-bounding-box");
    assert_eq!(report["content"]["trigger"], "load-check");
}

#[test]
fn test_config_warning_on_invalid_toml() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_dir = temp_dir.path().join(".perch");
    fs::create_dir_all(&config_dir).expect("Failed to create .perch dir");
    fs::write(config_dir.join("config.toml"), "invalid toml [[[")
        .expect("Failed to write invalid config");

    let output = run_perch(temp_dir.path(), &["config"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Warning: Could not load config"),
        "Expected warning in stderr, got: {}",
        stderr
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("settle_delay_ms: 200"), "got: {}", stdout);
}
