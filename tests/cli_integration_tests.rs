//! Integration tests for global CLI behaviour.

mod common;

use common::{TestFixture, refs_only_config};
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    pa_checker!()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn version_flag() {
    pa_checker!()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pa-checker"));
}

#[test]
fn unknown_subcommand_fails() {
    pa_checker!().arg("grade").assert().failure();
}

#[test]
fn quiet_run_prints_nothing_to_stdout() {
    let fixture = TestFixture::new();
    fixture.create_config(&refs_only_config(&[("Test 1", "t1", 10)]));

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--quiet"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("executable not found"));
}

#[test]
fn log_file_receives_run_logs() {
    let fixture = TestFixture::new();
    fixture.create_config(&refs_only_config(&[("Test 1", "t1", 10)]));
    let log = fixture.path().join("checker.log");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--log-file", log.to_str().unwrap()])
        .env_remove("RUST_LOG")
        .assert()
        .code(1);

    let content = std::fs::read_to_string(log).unwrap();
    assert!(content.contains("not found"));
}
