//! The report contract a checker returns.
//!
//! Accessors default to "absent" so a partial report still serializes; the
//! serializer fills in null/empty values for whatever is missing.

use serde::Deserialize;
use serde_json::{Map, Value};

pub trait ReportLike {
    fn rows(&self) -> Option<u64> {
        None
    }

    fn columns(&self) -> Option<u64> {
        None
    }

    fn column_names(&self) -> Option<Vec<String>> {
        None
    }

    fn results(&self) -> Vec<&dyn ResultLike> {
        Vec::new()
    }
}

pub trait ResultLike {
    fn name(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    fn metrics(&self) -> Option<&Map<String, Value>> {
        None
    }

    fn message(&self) -> Option<&str> {
        None
    }
}

/// Report as the engine emits it over JSON. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoreReport {
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub columns: Option<u64>,
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
    #[serde(default)]
    pub results: Option<Vec<CoreResult>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoreResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metrics: Option<Map<String, Value>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReportLike for CoreReport {
    fn rows(&self) -> Option<u64> {
        self.rows
    }

    fn columns(&self) -> Option<u64> {
        self.columns
    }

    fn column_names(&self) -> Option<Vec<String>> {
        self.column_names.clone()
    }

    fn results(&self) -> Vec<&dyn ResultLike> {
        self.results
            .iter()
            .flatten()
            .map(|r| r as &dyn ResultLike)
            .collect()
    }
}

impl ResultLike for CoreResult {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn metrics(&self) -> Option<&Map<String, Value>> {
        self.metrics.as_ref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Untyped JSON reports: attributes of the wrong type read as absent.
impl ReportLike for Value {
    fn rows(&self) -> Option<u64> {
        self.get("rows").and_then(Value::as_u64)
    }

    fn columns(&self) -> Option<u64> {
        self.get("columns").and_then(Value::as_u64)
    }

    /// Non-string names are kept in their JSON text form.
    fn column_names(&self) -> Option<Vec<String>> {
        let names = self.get("column_names")?.as_array()?;
        Some(
            names
                .iter()
                .map(|n| n.as_str().map_or_else(|| n.to_string(), str::to_string))
                .collect(),
        )
    }

    fn results(&self) -> Vec<&dyn ResultLike> {
        match self.get("results").and_then(Value::as_array) {
            Some(items) => items.iter().map(|r| r as &dyn ResultLike).collect(),
            None => Vec::new(),
        }
    }
}

impl ResultLike for Value {
    fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }

    fn metrics(&self) -> Option<&Map<String, Value>> {
        self.get("metrics").and_then(Value::as_object)
    }

    fn message(&self) -> Option<&str> {
        self.get("message").and_then(Value::as_str)
    }
}
