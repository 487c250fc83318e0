mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use common::Workspace;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::Path;

const OK_REPORT: &str = r#"{"rows":10,"columns":2,"column_names":["a","b"],"results":[{"name":"r1","status":"ok"}]}"#;
const ERROR_REPORT: &str = r#"{"rows":1,"columns":1,"column_names":["a"],"results":[{"name":"r1","status":"error","message":"nulls found"}]}"#;

/// `dcheck-runner run` with a `sh -c <script>` checker.
fn run_cmd(spec: &Path, script: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("dcheck-runner");
    cmd.env_remove("DCHECK_LOG_JSON")
        .args(["run", "--spec"])
        .arg(spec)
        .args(["--checker", "sh", "--checker-arg", "-c", "--checker-arg", script]);
    cmd
}

fn print_report(report: &str) -> String {
    format!("cat >/dev/null; printf '%s' '{report}'")
}

fn one_check(ws: &Workspace) -> std::path::PathBuf {
    ws.write_spec("version: 1\nrun:\n  output_dir: {out}\nchecks:\n  - source: sales.orders\n")
}

#[test]
fn passing_run_exits_0_and_writes_report() {
    let ws = Workspace::new();
    let spec = one_check(&ws);

    run_cmd(&spec, &print_report(OK_REPORT))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Wrote").and(predicate::str::contains("run.json")));

    let data = ws.read_run_json();
    let c0 = &data["checks"][0];
    assert_eq!(c0["failed"], Value::Bool(false));
    assert_eq!(c0["input"]["render"], Value::Bool(false));
    assert_eq!(
        c0["report"]["summary"]["status_counts"],
        json!({"ok": 1, "warning": 0, "error": 0, "fail": 0})
    );
}

#[test]
fn failing_status_exits_1() {
    let ws = Workspace::new();
    let spec = one_check(&ws);

    run_cmd(&spec, &print_report(ERROR_REPORT)).assert().code(1);

    let data = ws.read_run_json();
    assert_eq!(data["checks"][0]["failed"], Value::Bool(true));
    assert_eq!(data["checks"][0]["report"]["results"][0]["message"], "nulls found");
}

#[test]
fn checker_sees_locked_render_on_stdin() {
    let ws = Workspace::new();
    let spec = one_check(&ws);
    let script = format!(
        r#"input=$(cat); case "$input" in *'"render":false'*) printf '%s' '{OK_REPORT}';; *) exit 3;; esac"#
    );

    run_cmd(&spec, &script).assert().code(0);
    assert_eq!(ws.read_run_json()["checks"][0]["exception"], Value::Null);
}

#[test]
fn checker_exit_status_is_recorded_as_engine_error() {
    let ws = Workspace::new();
    let spec = one_check(&ws);

    run_cmd(&spec, "cat >/dev/null; echo 'no spark session' >&2; exit 4")
        .assert()
        .code(1);

    let c0 = ws.read_run_json()["checks"][0].clone();
    let exception = c0["exception"].as_str().unwrap().to_string();
    assert!(exception.starts_with("EngineError: "), "{exception}");
    assert!(exception.contains("no spark session"), "{exception}");
    assert_eq!(c0["report"], Value::Null);
}

#[test]
fn garbage_stdout_is_a_protocol_error() {
    let ws = Workspace::new();
    let spec = one_check(&ws);

    run_cmd(&spec, "cat >/dev/null; echo not-json").assert().code(1);

    let exception = ws.read_run_json()["checks"][0]["exception"].clone();
    assert!(exception.as_str().unwrap().starts_with("ProtocolError: "));
}

#[test]
fn invalid_spec_exits_2_without_output() {
    let ws = Workspace::new();
    let spec = ws.write_spec("version: 3\nrun:\n  output_dir: {out}\nchecks: [{source: x}]\n");

    run_cmd(&spec, &print_report(OK_REPORT))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("spec error").and(predicate::str::contains("version must be 1")));
    assert!(!ws.out_dir().exists());
}

#[test]
fn validate_prints_normalized_spec() {
    let ws = Workspace::new();
    let spec = ws.write_spec("version: 1\nchecks:\n  - source: ' x '\n    modules: a, b\n");

    let out = cargo_bin_cmd!("dcheck-runner")
        .args(["validate", "--spec"])
        .arg(&spec)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&out).expect("valid json output");

    assert_eq!(
        value,
        json!({
            "version": 1,
            "run": {"id": "run", "output_dir": "./out", "fail_on": ["error"], "stop_on_failure": false},
            "checks": [{"source": "x", "table_name": null, "cache": false, "modules": ["a", "b"], "config": null}]
        })
    );
}
