//! Spec layer: run spec document + validated in-memory structures.
//!
//! This module is intentionally separate from execution and rendering.
//! It owns:
//! - Status vocabulary (ok/warning/error/fail)
//! - Run spec loading and validation (spec.yml)
//! - The dynamic document value helpers, which never leave this module

pub mod enterprise;
pub mod error;
pub mod status;
mod value;

pub use enterprise::{load_spec, CheckJob, EnterpriseSpec, RunSpec, LOCKED_RENDER_KEY};
pub use error::SpecError;
pub use status::Status;
