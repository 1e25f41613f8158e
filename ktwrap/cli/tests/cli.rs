use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../lib/tests/fixtures/telegram/ktwrap.toml")
}

#[allow(deprecated)] // Command::cargo_bin
fn ktwrap_cmd() -> Command {
    Command::cargo_bin("ktwrap").unwrap()
}

#[test]
fn test_help_flag() {
    ktwrap_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kotlin wrapper generator"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--only"));
}

#[test]
fn test_version_flag() {
    ktwrap_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ktwrap"));
}

#[test]
fn test_dry_run_prints_files() {
    let out = TempDir::new().unwrap();
    ktwrap_cmd()
        .arg(fixture_config())
        .arg("--output")
        .arg(out.path())
        .args(["--dry-run", "--only", "Objects"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Objects.kt ==="))
        .stdout(predicate::str::contains("package org.bots.objects"))
        .stdout(predicate::str::contains("fun ordering("))
        .stdout(predicate::str::contains("Methods.kt").not());

    assert!(!out.path().join("org").exists());
}

#[test]
fn test_generate_writes_files_and_summary() {
    let out = TempDir::new().unwrap();
    ktwrap_cmd()
        .arg(fixture_config())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("DefaultKTelegramClient"))
        .stdout(predicate::str::contains("Generated 24 declarations in 5 files"));

    assert!(out.path().join("org/bots/objects/Objects.kt").exists());
    assert!(out.path().join("org/bots/core/DefaultKTelegramClient.kt").exists());
}

#[test]
fn test_unknown_only_target_fails() {
    let out = TempDir::new().unwrap();
    ktwrap_cmd()
        .arg(fixture_config())
        .arg("--output")
        .arg(out.path())
        .args(["--only", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no target produces file `Nope`"));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    ktwrap_cmd()
        .arg(dir.path().join("ktwrap.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ktwrap.toml");
    std::fs::write(&config, "source_roots = []\n").unwrap();
    ktwrap_cmd()
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("`source_roots` must not be empty"));
}
