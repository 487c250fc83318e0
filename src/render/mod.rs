//! Output rendering for the run report.

pub mod json;

pub use json::{render_run_json, write_run_json, RUN_FILE_NAME};
