//! Binary smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn finguard(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("finguard").unwrap();
    cmd.env("FINGUARD_DATA_DIR", data_dir.path())
        .env("FINGUARD_ENCRYPTION_KEY", "42".repeat(32));
    cmd
}

#[test]
fn init_and_config() {
    let temp = TempDir::new().unwrap();

    finguard(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized finguard"));

    finguard(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit.log"));
}

#[test]
fn record_set_show_roundtrip() {
    let temp = TempDir::new().unwrap();

    finguard(&temp)
        .args(["record", "set", "user-1", "monthly_income", "5000", "--actor", "user-1"])
        .assert()
        .success();

    // The subject sees the decrypted value
    finguard(&temp)
        .args(["record", "show", "user-1", "--actor", "user-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000"));

    // A stranger is denied
    finguard(&temp)
        .args(["record", "show", "user-1", "--actor", "user-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not permitted"));
}

#[test]
fn migrate_defaults_to_dry_run() {
    let temp = TempDir::new().unwrap();

    finguard(&temp)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    finguard(&temp)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("Key check"));
}

#[test]
fn missing_key_is_a_hard_error() {
    let temp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("finguard").unwrap();
    cmd.env("FINGUARD_DATA_DIR", temp.path())
        .env_remove("FINGUARD_ENCRYPTION_KEY")
        .args(["record", "show", "user-1", "--actor", "user-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key format error"));
}
