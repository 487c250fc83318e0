//! Batch runner for the dcheck validation engine.
//!
//! spec.yml -> [`spec::load_spec`] -> [`runner::run`] (checker + [`view::to_view`]
//! per job) -> `<output_dir>/run.json`.

pub mod checker;
pub mod logging;
pub mod model;
pub mod render;
pub mod runner;
pub mod spec;
pub mod view;

pub type Result<T> = anyhow::Result<T>;
