//! End-to-end CLI tests: spawn the built binary, feed it trace files and
//! formula strings, assert on its stdout/stderr/exit code.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn trace_file(json: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    write!(f, "{json}").unwrap();
    f
}

#[test]
fn parse_prints_canonical_form() {
    let mut cmd = Command::cargo_bin("mtl-weaken").unwrap();
    cmd.arg("parse").arg("F[0,2] a");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("F[0,2] (a)"));
}

#[test]
fn weaken_widens_eventually_interval() {
    let trace = trace_file(r#"{"states": [[], [], ["p"]], "loop_start": 2}"#);
    let mut cmd = Command::cargo_bin("mtl-weaken").unwrap();
    cmd.arg("weaken")
        .arg("F[0,1] p")
        .arg("--trace")
        .arg(trace.path())
        .arg("--at")
        .arg("0");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("weakened"));
}

#[test]
fn weaken_reports_no_weakening_when_unreachable() {
    let trace = trace_file(r#"{"states": [[], []], "loop_start": null}"#);
    let mut cmd = Command::cargo_bin("mtl-weaken").unwrap();
    cmd.arg("weaken")
        .arg("F[0,1] p")
        .arg("--trace")
        .arg(trace.path())
        .arg("--at")
        .arg("0");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no weakening"));
}

#[test]
fn json_output_is_valid_json() {
    let trace = trace_file(r#"{"states": [[], [], ["p"]], "loop_start": 2}"#);
    let mut cmd = Command::cargo_bin("mtl-weaken").unwrap();
    cmd.arg("--format")
        .arg("json")
        .arg("weaken")
        .arg("F[0,1] p")
        .arg("--trace")
        .arg(trace.path())
        .arg("--at")
        .arg("0");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"weakened_interval\""));
}

#[test]
fn to_ltl_unrolls_bounded_eventually() {
    let mut cmd = Command::cargo_bin("mtl-weaken").unwrap();
    cmd.arg("to-ltl").arg("F[0,2] a");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("X ("));
}

#[test]
fn invalid_formula_fails_with_nonzero_exit() {
    let trace = trace_file(r#"{"states": [[]], "loop_start": null}"#);
    let mut cmd = Command::cargo_bin("mtl-weaken").unwrap();
    cmd.arg("weaken")
        .arg("F[2,1] p")
        .arg("--trace")
        .arg(trace.path());
    cmd.assert().failure();
}
