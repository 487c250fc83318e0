//! Sequential job runner.
//!
//! Loads the spec, calls the checker once per job in declared order, applies
//! the fail/stop policy, and writes run.json once at the end.

use crate::checker::{CheckError, CheckInput, Checker};
use crate::model::{CheckOutcome, RunMeta, RunReport, RunSummary, SCHEMA};
use crate::render;
use crate::spec::{load_spec, EnterpriseSpec, Status};
use crate::view::{to_view, ValidationReportView};
use crate::Result;
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Load `spec_path`, execute every job, write `<output_dir>/run.json`.
///
/// Returns the exit code (0 or 1). A `SpecError` comes back as the error,
/// recoverable with `downcast_ref::<SpecError>()`, and nothing is written.
pub fn run<C: Checker>(spec_path: impl AsRef<Path>, checker: &mut C) -> Result<i32> {
    Ok(run_and_write(spec_path, checker)?.report.exit_code())
}

/// A finished run and where its report was written.
#[derive(Debug)]
pub struct Completed {
    pub report: RunReport,
    pub path: PathBuf,
}

pub fn run_and_write<C: Checker>(
    spec_path: impl AsRef<Path>,
    checker: &mut C,
) -> Result<Completed> {
    let spec = load_spec(spec_path.as_ref())?;

    let out_dir = Path::new(&spec.run.output_dir);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;

    let report = execute(&spec, checker);
    let path = render::write_run_json(out_dir, &report)?;

    tracing::info!(
        run_id = %report.run.id,
        path = %path.display(),
        executed = report.summary.checks_executed,
        failed = report.summary.checks_failed,
        "run finished"
    );
    Ok(Completed { report, path })
}

/// Execute the jobs of an already validated spec and assemble the report.
pub fn execute<C: Checker>(spec: &EnterpriseSpec, checker: &mut C) -> RunReport {
    let started_utc = utc_now();
    tracing::info!(
        run_id = %spec.run.id,
        checks = spec.checks.len(),
        fail_on = ?spec.run.fail_on,
        stop_on_failure = spec.run.stop_on_failure,
        "run started"
    );

    let mut checks: Vec<CheckOutcome> = Vec::with_capacity(spec.checks.len());
    let mut failed_total = 0usize;

    for (idx, job) in spec.checks.iter().enumerate() {
        let check_id = (idx + 1).to_string();
        let input = CheckInput::locked(job);
        tracing::debug!(check_id = %check_id, source = %input.source, "check started");

        let t0 = Instant::now();
        let attempt = invoke(checker, &input);
        let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (failed, report, exception) = match attempt {
            Ok(view) => (breaches(&view, &spec.run.fail_on), Some(view), None),
            Err(e) => {
                let text = e.describe();
                tracing::warn!(
                    check_id = %check_id,
                    source = %input.source,
                    error = %text,
                    "checker raised"
                );
                (true, None, Some(text))
            }
        };

        if failed {
            failed_total += 1;
        }
        tracing::info!(
            check_id = %check_id,
            source = %input.source,
            failed,
            duration_ms,
            "check finished"
        );

        checks.push(CheckOutcome {
            check_id,
            input,
            duration_ms,
            failed,
            report,
            exception,
        });

        if failed && spec.run.stop_on_failure {
            let skipped = spec.checks.len() - checks.len();
            tracing::warn!(
                check_id = idx + 1,
                skipped,
                "stop_on_failure: not running remaining checks"
            );
            break;
        }
    }

    let finished_utc = utc_now();

    RunReport {
        schema: SCHEMA,
        run: RunMeta {
            id: spec.run.id.clone(),
            started_utc,
            finished_utc,
            fail_on: spec.run.fail_on.clone(),
            stop_on_failure: spec.run.stop_on_failure,
            output_dir: spec.run.output_dir.clone(),
        },
        summary: RunSummary {
            checks_total: spec.checks.len(),
            checks_executed: checks.len(),
            checks_failed: failed_total,
        },
        checks,
    }
}

/// Call the checker and serialize its report. Errors and panics from either
/// step become a `CheckError`.
fn invoke<C: Checker>(
    checker: &mut C,
    input: &CheckInput,
) -> std::result::Result<ValidationReportView, CheckError> {
    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        checker.check(input).map(|report| to_view(&report))
    }));
    match caught {
        Ok(result) => result,
        Err(payload) => Err(CheckError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "checker panicked".to_string()
    }
}

fn breaches(view: &ValidationReportView, fail_on: &[Status]) -> bool {
    view.summary.status_counts.any(fail_on)
}

/// ISO-8601 UTC with a `Z` suffix, e.g. `2024-05-01T12:00:00.123456Z`.
fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
