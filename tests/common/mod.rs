#![allow(dead_code)]

use dcheck_runner::checker::{CheckError, CheckInput};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated directory holding a spec file and the run output.
pub struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    /// Write `body` to spec.yml. `{out}` is replaced by the quoted output dir.
    pub fn write_spec(&self, body: &str) -> PathBuf {
        let quoted = format!("{:?}", self.out_dir().display().to_string());
        let path = self.tmp.path().join("spec.yml");
        fs::write(&path, body.replace("{out}", &quoted)).expect("write spec");
        path
    }

    pub fn run_json_path(&self) -> PathBuf {
        self.out_dir().join("run.json")
    }

    pub fn read_run_json(&self) -> Value {
        let text = fs::read_to_string(self.run_json_path()).expect("read run.json");
        serde_json::from_str(&text).expect("valid run.json")
    }
}

pub type CheckResult = Result<Value, CheckError>;

/// Checker returning the same report for every job.
pub fn fixed(report: Value) -> impl FnMut(&CheckInput) -> CheckResult {
    move |_: &CheckInput| Ok(report.clone())
}

pub fn report_with_status(status: &str) -> Value {
    serde_json::json!({
        "rows": 1,
        "columns": 1,
        "column_names": ["a"],
        "results": [{"name": "r1", "status": status, "metrics": {}, "message": "boom"}]
    })
}
