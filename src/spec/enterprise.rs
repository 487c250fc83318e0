//! Run spec document (spec.yml).
//!
//! YAML shape:
//! version: 1
//! run:
//!   id: nightly                  # default "run"
//!   output_dir: ./out            # default "./out"
//!   fail_on: [error, fail]       # or "error,fail"; default [error]
//!   stop_on_failure: false
//! checks:
//!   - source: sales.orders       # required
//!     table_name: orders         # optional
//!     cache: false
//!     modules: [core_quality]    # or "a,b"
//!     config: {threshold: 0.1}
//!
//! `render` is owned by the runner and may not appear on a check.

use crate::spec::value::{coerce_bool, coerce_string, describe, string_list, to_json, untag};
use crate::spec::{SpecError, Status};
use serde::Serialize;
use serde_yaml::{Mapping, Value as YamlValue};
use std::fs;
use std::path::Path;

pub const SUPPORTED_VERSION: u64 = 1;

/// Key that only the runner may set on a checker invocation.
pub const LOCKED_RENDER_KEY: &str = "render";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnterpriseSpec {
    pub version: u64,
    pub run: RunSpec,
    pub checks: Vec<CheckJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSpec {
    pub id: String,
    pub output_dir: String,
    pub fail_on: Vec<Status>,
    pub stop_on_failure: bool,
}

impl Default for RunSpec {
    fn default() -> Self {
        RunSpec {
            id: "run".to_string(),
            output_dir: "./out".to_string(),
            fail_on: vec![Status::Error],
            stop_on_failure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckJob {
    pub source: String,
    pub table_name: Option<String>,
    pub cache: bool,
    pub modules: Option<Vec<String>>,
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Read, parse and validate a spec file.
pub fn load_spec(path: impl AsRef<Path>) -> Result<EnterpriseSpec, SpecError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(SpecError::NotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|source| SpecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: YamlValue = serde_yaml::from_str(&text).map_err(|source| SpecError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let spec = EnterpriseSpec::from_document(&doc)?;
    tracing::debug!(
        path = %path.display(),
        run_id = %spec.run.id,
        checks = spec.checks.len(),
        "loaded spec"
    );
    Ok(spec)
}

impl EnterpriseSpec {
    /// Validate a parsed document and build the typed spec.
    pub fn from_document(doc: &YamlValue) -> Result<Self, SpecError> {
        let root = match untag(doc) {
            YamlValue::Mapping(m) => m,
            other => {
                return Err(SpecError::invalid(format!(
                    "spec root must be a mapping, got {}",
                    describe(other)
                )));
            }
        };

        let version = match root.get("version") {
            None => return Err(SpecError::invalid("version is required and must be 1")),
            Some(v) => match untag(v).as_u64() {
                Some(SUPPORTED_VERSION) => SUPPORTED_VERSION,
                _ => {
                    return Err(SpecError::invalid(format!(
                        "version must be 1, got {}",
                        describe(v)
                    )));
                }
            },
        };

        let run = parse_run(root.get("run"))?;

        let items = match root.get("checks").map(untag) {
            Some(YamlValue::Sequence(items)) if !items.is_empty() => items,
            Some(YamlValue::Sequence(_)) => {
                return Err(SpecError::invalid(
                    "checks must be a list with at least 1 item, got an empty list",
                ));
            }
            Some(other) => {
                return Err(SpecError::invalid(format!(
                    "checks must be a list with at least 1 item, got {}",
                    describe(other)
                )));
            }
            None => {
                return Err(SpecError::invalid(
                    "checks is required and must be a list with at least 1 item",
                ));
            }
        };

        let checks = items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_check(i, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EnterpriseSpec {
            version,
            run,
            checks,
        })
    }
}

fn parse_run(raw: Option<&YamlValue>) -> Result<RunSpec, SpecError> {
    let map = match raw.map(untag) {
        None | Some(YamlValue::Null) => return Ok(RunSpec::default()),
        Some(YamlValue::Mapping(m)) => m,
        Some(other) => {
            return Err(SpecError::invalid(format!(
                "run must be a mapping, got {}",
                describe(other)
            )));
        }
    };

    let mut run = RunSpec::default();

    if let Some(v) = present(map, "id") {
        run.id = coerce_string(v);
    }
    if let Some(v) = present(map, "output_dir") {
        run.output_dir = coerce_string(v);
    }
    if let Some(v) = map.get("fail_on") {
        run.fail_on = parse_fail_on(v)?;
    }
    if let Some(v) = map.get("stop_on_failure") {
        run.stop_on_failure = coerce_bool(v);
    }

    Ok(run)
}

fn parse_fail_on(v: &YamlValue) -> Result<Vec<Status>, SpecError> {
    let tokens = string_list(v).ok_or_else(|| {
        SpecError::invalid(format!(
            "run.fail_on must be a list of strings or a comma-separated string, got {}",
            describe(v)
        ))
    })?;

    let unknown: Vec<&String> = tokens
        .iter()
        .filter(|t| t.parse::<Status>().is_err())
        .collect();
    if !unknown.is_empty() {
        return Err(SpecError::invalid(format!(
            "run.fail_on contains unknown statuses: {:?} (allowed={:?})",
            unknown,
            Status::allowed_names()
        )));
    }

    let mut statuses = Vec::with_capacity(tokens.len());
    for status in tokens.iter().filter_map(|t| t.parse::<Status>().ok()) {
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }
    Ok(statuses)
}

fn parse_check(i: usize, item: &YamlValue) -> Result<CheckJob, SpecError> {
    let map = match untag(item) {
        YamlValue::Mapping(m) => m,
        other => {
            return Err(SpecError::invalid(format!(
                "checks[{i}] must be a mapping, got {}",
                describe(other)
            )));
        }
    };

    let source = match map.get("source").map(untag) {
        Some(YamlValue::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(other) => {
            return Err(SpecError::invalid(format!(
                "checks[{i}].source must be a non-empty string, got {}",
                describe(other)
            )));
        }
        None => {
            return Err(SpecError::invalid(format!(
                "checks[{i}].source is required and must be a non-empty string"
            )));
        }
    };

    let table_name = match map.get("table_name").map(untag) {
        None | Some(YamlValue::Null) => None,
        Some(YamlValue::String(s)) => Some(s.trim().to_string()),
        Some(other) => {
            return Err(SpecError::invalid(format!(
                "checks[{i}].table_name must be a string or null, got {}",
                describe(other)
            )));
        }
    };

    let cache = map.get("cache").is_some_and(coerce_bool);

    let modules = match map.get("modules").map(untag) {
        None | Some(YamlValue::Null) => None,
        Some(v) => Some(string_list(v).ok_or_else(|| {
            SpecError::invalid(format!(
                "checks[{i}].modules must be a list of strings, a comma-separated string, or null, got {}",
                describe(v)
            ))
        })?),
    };

    let config = match map.get("config").map(untag) {
        None | Some(YamlValue::Null) => None,
        Some(v @ YamlValue::Mapping(_)) => match to_json(&format!("checks[{i}].config"), v)? {
            serde_json::Value::Object(obj) => Some(obj),
            _ => None,
        },
        Some(other) => {
            return Err(SpecError::invalid(format!(
                "checks[{i}].config must be a mapping or null, got {}",
                describe(other)
            )));
        }
    };

    if map.contains_key(LOCKED_RENDER_KEY) {
        return Err(SpecError::invalid(format!(
            "checks[{i}] must not specify {LOCKED_RENDER_KEY} (the runner always sets {LOCKED_RENDER_KEY}=false)"
        )));
    }

    Ok(CheckJob {
        source,
        table_name,
        cache,
        modules,
        config,
    })
}

/// Scalar run fields treat an explicit null like an absent key.
fn present<'a>(map: &'a Mapping, key: &str) -> Option<&'a YamlValue> {
    map.get(key).filter(|v| !untag(v).is_null())
}
