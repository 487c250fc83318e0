use std::path::PathBuf;

/// Terminal error of [`crate::spec::load_spec`]. No partial spec is ever returned.
#[derive(thiserror::Error, Debug)]
pub enum SpecError {
    #[error("spec file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("read spec file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse spec file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

impl SpecError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SpecError::Invalid(msg.into())
    }
}
