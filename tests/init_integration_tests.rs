//! Integration tests for the `init` command.

mod common;

use common::TestFixture;
use predicates::prelude::*;

#[test]
fn init_creates_default_config_file() {
    let fixture = TestFixture::new();

    pa_checker!()
        .current_dir(fixture.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    let content = std::fs::read_to_string(fixture.path().join(".pa-checker.toml")).unwrap();
    assert!(content.contains("[ref_checker]"));
    assert!(content.contains("[[tests]]"));
}

#[test]
fn init_creates_config_at_custom_path() {
    let fixture = TestFixture::new();
    let custom_path = fixture.path().join("grading.toml");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["init", custom_path.to_str().unwrap()])
        .assert()
        .success();

    assert!(custom_path.exists());
}

#[test]
fn init_fails_if_config_exists() {
    let fixture = TestFixture::new();
    fixture.create_config("# existing config\n");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_force_overwrites() {
    let fixture = TestFixture::new();
    fixture.create_config("# existing config\n");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["init", "--force"])
        .assert()
        .success();

    let content = std::fs::read_to_string(fixture.path().join(".pa-checker.toml")).unwrap();
    assert!(!content.contains("existing config"));
}

#[test]
fn generated_config_is_accepted_by_run() {
    let fixture = TestFixture::new();

    pa_checker!()
        .current_dir(fixture.path())
        .args(["init"])
        .assert()
        .success();

    // The template points at ./main, which does not exist yet.
    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--color", "never", "--no-valgrind"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ERR] ./main not found"));
}
