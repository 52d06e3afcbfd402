//! Integration tests for the `run` command.

mod common;

use common::{TestFixture, refs_only_config};
use predicates::prelude::*;

const SCENARIO: &[(&str, &str, u32)] = &[("Test 1", "t1", 40), ("Test 2", "t2", 30), ("Test 3", "t3", 30)];

#[cfg(unix)]
fn graded_fixture() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.create_config(&refs_only_config(SCENARIO));
    fixture.create_script("main", "cp \"$1\" \"$2\"");
    fixture.create_case("t1", "1 2 3\n", "1 2 3\n");
    fixture.create_case("t2", "hello\n", "hello\n");
    fixture.create_case("t3", "wrong\n", "right\n");
    fixture
}

#[cfg(unix)]
#[test]
fn run_prints_module_reports_and_score() {
    let fixture = graded_fixture();

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("===== Summary ====="))
        .stdout(predicate::str::contains("REFS    - 2 / 3"))
        .stdout(predicate::str::contains("Score: 70"));

    assert!(fixture.path().join("tests/out/t1.out").exists());
    assert!(fixture.path().join("tests/forward/t1.stdout").exists());
}

#[cfg(unix)]
#[test]
fn run_json_output() {
    let fixture = graded_fixture();

    let output = pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_score"], 70);
    assert_eq!(json["modules"][0]["name"], "REFS");
    assert_eq!(json["modules"][0]["result"], "2 / 3");
    assert_eq!(json["tests"].as_array().unwrap().len(), 3);
}

#[cfg(unix)]
#[test]
fn run_writes_report_to_file() {
    let fixture = graded_fixture();
    let report = fixture.path().join("reports/grade.json");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--format", "json", "--output", report.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(report).unwrap();
    assert!(content.contains("\"total_score\": 70"));
}

#[cfg(unix)]
#[test]
fn run_with_executable_override() {
    let fixture = graded_fixture();
    fixture.create_script("bin/alt", "echo \"1 2 3\" > \"$2\"");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--color", "never", "--executable", "bin/alt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REFS    - 1 / 3"))
        .stdout(predicate::str::contains("Score: 40"));
}

#[test]
fn run_missing_executable_exits_with_run_failure() {
    let fixture = TestFixture::new();
    fixture.create_config(&refs_only_config(&[("Test 1", "t1", 10)]));

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--color", "never"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ERR] ./main not found"))
        .stdout(predicate::str::contains("REFS    - PANIC!"))
        .stdout(predicate::str::contains("Score: 0"));
}

#[test]
fn run_invalid_config_exits_with_config_error() {
    let fixture = TestFixture::new();
    fixture.create_config("version = \"9\"\n");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported config version"));
}

#[test]
fn run_malformed_config_exits_with_config_error() {
    let fixture = TestFixture::new();
    fixture.create_config("[[tests]\nname = ");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("TOML parse error"));
}

#[cfg(unix)]
#[test]
fn run_explicit_config_path() {
    let fixture = TestFixture::new();
    let config = fixture.create_file("grading/custom.toml", "version = \"1\"\n");

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--color", "never", "-e", "sh", "-c", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0"));
}

#[test]
fn run_missing_explicit_config_fails() {
    let fixture = TestFixture::new();

    pa_checker!()
        .current_dir(fixture.path())
        .args(["run", "--config", "absent.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to access file"));
}
