use crate::model::RunReport;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const RUN_FILE_NAME: &str = "run.json";

/// Render run.json: two-space indent, keys sorted, non-ASCII kept literal.
///
/// Sorting comes from going through `serde_json::Value`, whose objects are
/// BTreeMap-backed as long as serde_json's `preserve_order` feature is off.
pub fn render_run_json(report: &RunReport) -> anyhow::Result<String> {
    let value = serde_json::to_value(report).context("encode run report")?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

/// Write `<out_dir>/run.json`. `out_dir` must already exist.
pub fn write_run_json(out_dir: &Path, report: &RunReport) -> anyhow::Result<PathBuf> {
    let path = out_dir.join(RUN_FILE_NAME);
    let text = render_run_json(report)?;
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
