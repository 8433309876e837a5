// ABOUTME: Integration tests for the kymata CLI commands.
// ABOUTME: Validates --help output, exit codes, and early failure paths.

use assert_cmd::Command;
use predicates::prelude::*;

fn kymata_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kymata"))
}

#[test]
fn help_shows_commands() {
    kymata_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("operators"))
        .stdout(predicate::str::contains("bootstrap"))
        .stdout(predicate::str::contains("applications"))
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn sync_trigger_help_shows_flags() {
    kymata_cmd()
        .args(["sync", "trigger", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--poll-interval"));
}

#[test]
fn sync_trigger_without_config_exits_with_1() {
    let temp_dir = tempfile::tempdir().unwrap();

    kymata_cmd()
        .current_dir(temp_dir.path())
        .args(["sync", "trigger", "dev"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn sync_trigger_rejects_invalid_environment_name() {
    let temp_dir = tempfile::tempdir().unwrap();

    kymata_cmd()
        .current_dir(temp_dir.path())
        .args(["sync", "trigger", "PROD"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn bootstrap_without_script_exits_with_1() {
    let temp_dir = tempfile::tempdir().unwrap();

    kymata_cmd()
        .current_dir(temp_dir.path())
        .args(["bootstrap", "resources", "dev", "--region", "eu-west-1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no provisioning script"));
}

#[test]
fn operators_setup_without_config_exits_with_1() {
    let temp_dir = tempfile::tempdir().unwrap();

    kymata_cmd()
        .current_dir(temp_dir.path())
        .args(["operators", "setup"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn operators_setup_without_operators_reports_it() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("kymata.yml"),
        r#"
server: http://localhost:8080
repo:
  url: https://github.com/org/logging-stack
applications:
  - name: storage
"#,
    )
    .unwrap();

    kymata_cmd()
        .current_dir(temp_dir.path())
        .args(["operators", "setup"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no operator units"));
}
