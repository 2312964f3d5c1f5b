#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn snapshot_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("config-snapshot").unwrap();
    cmd.arg("--config-dir")
        .arg(dir.path().join(".claude"))
        .env("RUST_LOG", "warn");
    cmd
}

fn create(dir: &TempDir) -> String {
    let output = snapshot_cmd(dir)
        .args(["create", "--reason", "cli test"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    report["id"].as_str().unwrap().to_string()
}

#[test]
fn create_then_list_shows_snapshot() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".claude/agents")).unwrap();
    fs::write(dir.path().join(".claude/agents/tester.md"), "# tester").unwrap();

    let id = create(&dir);

    snapshot_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()))
        .stdout(predicate::str::contains("agents/tester.md"));
}

#[test]
fn restore_by_component_round_trips() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".claude/hooks")).unwrap();
    fs::write(dir.path().join(".claude/hooks/check.py"), "v1").unwrap();

    let id = create(&dir);
    fs::write(dir.path().join(".claude/hooks/check.py"), "v2").unwrap();

    snapshot_cmd(&dir)
        .args(["restore", &id, "--component", "hooks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));

    assert_eq!(fs::read_to_string(dir.path().join(".claude/hooks/check.py")).unwrap(), "v1");
}

#[test]
fn unknown_component_is_rejected() {
    let dir = TempDir::new().unwrap();
    snapshot_cmd(&dir)
        .args(["create", "--component", "commands"])
        .assert()
        .failure();
}

#[test]
fn verify_missing_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    snapshot_cmd(&dir)
        .args(["verify", "2026-01-01T00-00-00-000Z-00000000"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\": false"));
}

#[test]
fn cleanup_respects_keep() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".claude")).unwrap();
    create(&dir);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newest = create(&dir);

    snapshot_cmd(&dir)
        .args(["cleanup", "--keep", "1"])
        .assert()
        .success();

    snapshot_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(newest.as_str()));
}
