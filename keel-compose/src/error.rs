//! Error types for the manifest runner

use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors raised while validating or running a manifest
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Manifest text is not a usable compose document
    #[error("Invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    /// The compose binary could not be started or talked to
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The compose command ran and exited non-zero
    #[error("`{command}` exited with code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// `compose ps` output could not be decoded
    #[error("Failed to parse status output: {reason}")]
    StatusParse { reason: String },
}

impl RunnerError {
    pub fn invalid_manifest(reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            reason: reason.into(),
        }
    }
}
