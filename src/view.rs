//! Serializer: project whatever the checker returned onto the stable
//! `report` schema stored in run.json.

use crate::checker::{ReportLike, ResultLike};
use crate::spec::Status;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReportView {
    pub rows: Option<u64>,
    pub columns: Option<u64>,
    pub column_names: Option<Vec<String>>,
    pub results: Vec<ResultView>,
    pub summary: ReportSummaryView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub name: Option<String>,
    pub status: Option<String>,
    pub metrics: Map<String, Value>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummaryView {
    pub status_counts: StatusCounts,
}

/// Count per recognized status. Always carries all four keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub ok: u64,
    pub warning: u64,
    pub error: u64,
    pub fail: u64,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> u64 {
        match status {
            Status::Ok => self.ok,
            Status::Warning => self.warning,
            Status::Error => self.error,
            Status::Fail => self.fail,
        }
    }

    fn bump(&mut self, status: Status) {
        let slot = match status {
            Status::Ok => &mut self.ok,
            Status::Warning => &mut self.warning,
            Status::Error => &mut self.error,
            Status::Fail => &mut self.fail,
        };
        *slot += 1;
    }

    /// True if any of `statuses` was seen at least once.
    pub fn any(&self, statuses: &[Status]) -> bool {
        statuses.iter().any(|s| self.get(*s) > 0)
    }
}

/// Build the view. Never fails; missing attributes become null or empty.
pub fn to_view<R: ReportLike + ?Sized>(report: &R) -> ValidationReportView {
    let results: Vec<ResultView> = report.results().into_iter().map(result_view).collect();

    ValidationReportView {
        rows: report.rows(),
        columns: report.columns(),
        column_names: report.column_names(),
        summary: ReportSummaryView {
            status_counts: status_counts(&results),
        },
        results,
    }
}

fn result_view(r: &dyn ResultLike) -> ResultView {
    ResultView {
        name: r.name().map(str::to_string),
        status: r.status().map(str::to_string),
        metrics: r.metrics().cloned().unwrap_or_default(),
        message: r.message().map(str::to_string),
    }
}

/// Statuses outside the vocabulary are not counted.
fn status_counts(results: &[ResultView]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for status in results
        .iter()
        .filter_map(|r| r.status.as_deref())
        .filter_map(|s| s.parse::<Status>().ok())
    {
        counts.bump(status);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CoreReport, CoreResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn counts_recognized_statuses_only() {
        let report = json!({
            "results": [
                {"name": "a", "status": "ok"},
                {"name": "b", "status": "error"},
                {"name": "c", "status": "error"},
                {"name": "d", "status": "skipped"},
                {"name": "e"},
            ]
        });
        let view = to_view(&report);
        assert_eq!(
            view.summary.status_counts,
            StatusCounts {
                ok: 1,
                warning: 0,
                error: 2,
                fail: 0
            }
        );
        assert_eq!(view.results.len(), 5);
        assert_eq!(view.results[4].status, None);
    }

    #[test]
    fn empty_report_has_null_shape_and_zero_counts() {
        let view = to_view(&CoreReport::default());
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "rows": null,
                "columns": null,
                "column_names": null,
                "results": [],
                "summary": {"status_counts": {"ok": 0, "warning": 0, "error": 0, "fail": 0}}
            })
        );
    }

    #[test]
    fn metrics_default_to_empty_mapping() {
        let report = CoreReport {
            rows: Some(10),
            columns: Some(2),
            column_names: Some(vec!["a".into(), "b".into()]),
            results: Some(vec![CoreResult {
                name: Some("r1".into()),
                status: Some("ok".into()),
                metrics: None,
                message: None,
            }]),
        };
        let value = serde_json::to_value(to_view(&report)).unwrap();
        assert_eq!(value["results"][0]["metrics"], json!({}));
        assert_eq!(value["results"][0]["message"], Value::Null);
        assert_eq!(value["column_names"], json!(["a", "b"]));
    }

    #[test]
    fn any_matches_fail_policy() {
        let counts = StatusCounts {
            warning: 1,
            ..StatusCounts::default()
        };
        assert!(counts.any(&[Status::Error, Status::Warning]));
        assert!(!counts.any(&[Status::Error]));
        assert!(!counts.any(&[]));
    }
}
