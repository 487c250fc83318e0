//! Checker capability: the seam between the runner and the external
//! validation engine.
//!
//! The runner never calls an engine directly. It is handed something that
//! implements [`Checker`] (a closure in tests, [`CommandChecker`] in the CLI)
//! and calls it once per job with a [`CheckInput`].

pub mod command;
pub mod report;

pub use command::CommandChecker;
pub use report::{CoreReport, CoreResult, ReportLike, ResultLike};

use crate::spec::CheckJob;
use serde::Serialize;

/// Parameters of one checker invocation, echoed verbatim into the outcome.
///
/// Only [`CheckInput::locked`] builds one, and it always sets `render` to false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInput {
    pub source: String,
    pub table_name: Option<String>,
    render: bool,
    pub cache: bool,
    pub modules: Option<Vec<String>>,
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CheckInput {
    pub fn locked(job: &CheckJob) -> Self {
        CheckInput {
            source: job.source.clone(),
            table_name: job.table_name.clone(),
            render: false,
            cache: job.cache,
            modules: job.modules.clone(),
            config: job.config.clone(),
        }
    }

    pub fn render(&self) -> bool {
        self.render
    }
}

/// Per-job checker failure. Recorded in the outcome, never fatal to the run.
#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    Engine(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Panic(String),
}

impl CheckError {
    pub fn engine(msg: impl Into<String>) -> Self {
        CheckError::Engine(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Engine(_) => "EngineError",
            CheckError::InvalidInput(_) => "InvalidInput",
            CheckError::Protocol(_) => "ProtocolError",
            CheckError::Io(_) => "IoError",
            CheckError::Panic(_) => "Panic",
        }
    }

    /// `"<kind>: <message>"`, the form stored in `checks[].exception`.
    pub fn describe(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

pub trait Checker {
    type Report: ReportLike;

    fn check(&mut self, input: &CheckInput) -> Result<Self::Report, CheckError>;
}

impl<F, R> Checker for F
where
    F: FnMut(&CheckInput) -> Result<R, CheckError>,
    R: ReportLike,
{
    type Report = R;

    fn check(&mut self, input: &CheckInput) -> Result<R, CheckError> {
        self(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_input_never_renders() {
        let job = CheckJob {
            source: "sales.orders".into(),
            table_name: Some("orders".into()),
            cache: true,
            modules: Some(vec!["core_quality".into()]),
            config: None,
        };
        let input = CheckInput::locked(&job);
        assert!(!input.render());

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["render"], serde_json::Value::Bool(false));
        assert_eq!(json["cache"], serde_json::Value::Bool(true));
        assert_eq!(json["table_name"], "orders");
    }

    #[test]
    fn describe_prefixes_kind() {
        assert_eq!(CheckError::engine("no spark").describe(), "EngineError: no spark");
        let io = CheckError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.describe(), "IoError: gone");
    }
}
