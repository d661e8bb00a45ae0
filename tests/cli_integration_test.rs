//! Integration tests for the mockingbird binary.

use assert_cmd::Command;
use indoc::indoc;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn mockingbird() -> Command {
    let mut cmd = Command::cargo_bin("mockingbird").expect("binary is built");
    cmd.env_remove("MOCKINGBIRD_CONFIG")
        .env_remove("MOCKINGBIRD_TRACE")
        .env_remove("MOCKINGBIRD_REPORT_LIMIT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_list_names_every_scenario() {
    let output = mockingbird().arg("list").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for scenario in mockingbird::scenarios::catalogue() {
        assert!(
            stdout.contains(scenario.name),
            "missing {} in:\n{stdout}",
            scenario.name
        );
    }
}

#[test]
fn test_run_all_scenarios_pass() {
    let temp_dir = TempDir::new().unwrap();
    let output = mockingbird()
        .current_dir(temp_dir.path())
        .arg("run")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "run failed:\n{stdout}");
    assert!(stdout.contains("PASS stubbing"));
    assert!(stdout.contains(" 0 failed"));
}

#[test]
fn test_run_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let output = mockingbird()
        .current_dir(temp_dir.path())
        .args(["run", "--only", "spy", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("Output is not valid JSON");
    assert_eq!(json["passed"], 2);
    assert_eq!(json["failed"], 0);
    let names: Vec<&str> = json["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["spy", "spy-do-return"]);
}

#[test]
fn test_run_with_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("session.toml");
    fs::write(
        &config_path,
        indoc! {r#"
            report_limit = 3
            trace_invocations = true
        "#},
    )
    .unwrap();

    mockingbird()
        .args(["run", "--only", "stubbing", "--config"])
        .arg(&config_path)
        .assert()
        .success();
}

#[test]
fn test_invalid_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("session.toml");
    fs::write(&config_path, "report_limit = 0\n").unwrap();

    let output = mockingbird()
        .args(["run", "--config"])
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("report_limit"));
}
