//! CLI integration tests.
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lifeline_cmd() -> Command {
    let mut cmd = Command::cargo_bin("lifeline").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_version_output() {
    lifeline_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lifeline"));
}

#[test]
fn test_help_shows_all_commands() {
    lifeline_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("predict"))
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_serve_help() {
    lifeline_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--stream-endpoint"))
        .stdout(predicate::str::contains("--autostart"));
}

#[test]
fn test_simulate_json() {
    let output = lifeline_cmd()
        .args(["simulate", "--count", "3", "--seed", "1", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["samples"].as_array().unwrap().len(), 3);
}

#[test]
fn test_simulate_table() {
    lifeline_cmd()
        .args(["simulate", "--kind", "high-glucose", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Glucose"))
        .stdout(predicate::str::contains("mg/dL"));
}

#[test]
fn test_simulate_rejects_unknown_kind() {
    lifeline_cmd()
        .args(["simulate", "--kind", "zombie"])
        .assert()
        .failure();
}

#[test]
fn test_predict_missing_reading_fails_without_network() {
    lifeline_cmd()
        .args([
            "predict",
            "--heart-rate",
            "72",
            "--diastolic",
            "76",
            "--spo2",
            "98",
            "--temperature",
            "36.6",
            "--endpoint",
            "http://127.0.0.1:9/predict",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid input: blood_pressure_systolic"));
}

#[test]
fn test_predict_unreachable_service_fails() {
    lifeline_cmd()
        .args([
            "predict",
            "--heart-rate",
            "72",
            "--systolic",
            "118",
            "--diastolic",
            "76",
            "--spo2",
            "98",
            "--temperature",
            "36.6",
            "--endpoint",
            "http://127.0.0.1:9/predict",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("lifeline.toml");

    lifeline_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[stream]"));
    assert!(content.contains("[prediction]"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("lifeline.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    lifeline_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read_to_string(&config_path).unwrap(),
        "existing content"
    );
}

#[test]
fn test_config_check_accepts_generated_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("lifeline.toml");

    lifeline_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success();

    lifeline_cmd()
        .args(["config", "check", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Window:      20 samples"));
}

#[test]
fn test_config_check_rejects_oversized_window() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("lifeline.toml");
    std::fs::write(&config_path, "[window]\ncapacity = 2000").unwrap();

    lifeline_cmd()
        .args(["config", "check", "-c", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window.capacity"));
}

#[test]
fn test_serve_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("lifeline.toml");
    std::fs::write(&config_path, "[simulation]\ninterval_ms = 10").unwrap();

    lifeline_cmd()
        .args(["serve", "-c", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("simulation.interval_ms"));
}

#[test]
fn test_completions_bash() {
    lifeline_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lifeline"));
}
