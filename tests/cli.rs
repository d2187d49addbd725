use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn autocompleter(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("autocompleter").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("AUTOCOMPLETER_ENDPOINT")
        .env_remove("AUTOCOMPLETER_API_KEY")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn test_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    autocompleter(&config)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));
    let written = fs::read_to_string(&config).unwrap();
    assert!(written.contains("debounce_delay_secs = 0.5"));
    assert!(written.contains("merge_policy = \"complete\""));

    autocompleter(&config)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_status_reports_offline_backend() {
    let dir = TempDir::new().unwrap();

    autocompleter(&dir.path().join("config.toml"))
        .args(["--offline", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local stub (offline)"))
        .stdout(predicate::str::contains("Merge policy: Complete"));
}

#[test]
fn test_suggest_with_stub_backend() {
    let dir = TempDir::new().unwrap();

    autocompleter(&dir.path().join("config.toml"))
        .args(["--offline", "suggest", "Hello wor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello wor..."));
}

#[test]
fn test_run_replays_typing_and_accept() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("session.jsonl");
    fs::write(
        &script,
        r#"{"step": "focus", "field": 1, "label": "Body"}
{"step": "type", "field": 1, "text": "Hello"}
{"step": "type", "field": 1, "text": " wor"}
{"step": "wait", "ms": 700}
{"step": "accept"}
{"step": "focus", "field": 2, "role": "protected"}
{"step": "type", "field": 2, "text": "hunter2"}
{"step": "wait", "ms": 700}
{"step": "accept"}
"#,
    )
    .unwrap();

    autocompleter(&dir.path().join("config.toml"))
        .args(["--offline", "run", "--events"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("field#1: Hello wor..."))
        .stdout(predicate::str::contains("field#2: hunter2"));
}

#[test]
fn test_run_reports_bad_script_line() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("broken.jsonl");
    fs::write(&script, "{\"step\": \"focus\", \"field\": 1}\n{\"step\": \"teleport\"}\n").unwrap();

    autocompleter(&dir.path().join("config.toml"))
        .args(["--offline", "run", "--events"])
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Replay").and(predicate::str::contains("line: 2")));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[coordinator]\ndebounce_delay_secs = -1.0\n").unwrap();

    autocompleter(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("debounce_delay_secs"));
}
