//! Run report model: what ends up in run.json.

use crate::checker::CheckInput;
use crate::spec::Status;
use crate::view::ValidationReportView;
use serde::Serialize;

pub const SCHEMA: &str = "dcheck-enterprise-runner/v1";

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub schema: &'static str,
    pub run: RunMeta,
    pub checks: Vec<CheckOutcome>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub id: String,
    pub started_utc: String,
    pub finished_utc: String,
    pub fail_on: Vec<Status>,
    pub stop_on_failure: bool,
    /// Echoed exactly as declared in the spec. `./out` stays `./out`.
    pub output_dir: String,
}

/// One executed job. `report` and `exception` are mutually exclusive.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub check_id: String,
    pub input: CheckInput,
    pub duration_ms: u64,
    pub failed: bool,
    pub report: Option<ValidationReportView>,
    pub exception: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Declared jobs, including any skipped by stop_on_failure.
    pub checks_total: usize,
    pub checks_executed: usize,
    pub checks_failed: usize,
}

impl RunReport {
    /// 0 if no job failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.summary.checks_failed > 0 { 1 } else { 0 }
    }
}
