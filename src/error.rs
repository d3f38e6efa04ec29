use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the wrapper.
///
/// Plain discovery calls never produce [`WrapperError::NotInstalled`]; a missing
/// tool is only an error once a version requirement has been asked for.
#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("{tool} is not installed.")]
    NotInstalled { tool: String },

    #[error("{tool} {required} is required. You have {found}.")]
    VersionMismatch {
        tool: String,
        /// The whole requirement expression as given, trimmed (`>= 999.0`), not a bare version.
        required: String,
        found: String,
    },

    #[error("Illformed requirement \"{expression}\": {reason}")]
    InvalidRequirement { expression: String, reason: String },

    #[error("Failed to execute {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WrapperError {
    pub(crate) fn invalid_requirement(expression: &str, reason: impl Into<String>) -> Self {
        WrapperError::InvalidRequirement {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = WrapperError> = std::result::Result<T, E>;
