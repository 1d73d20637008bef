//! Compose backend error types.

use std::time::Duration;

use thiserror::Error;

use rescale_autoscale::{ActuateError, SampleError};

/// Errors raised while driving the docker CLI.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("`{command}` failed (exit code {code}): {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("unexpected docker output: {0}")]
    Parse(String),
}

pub type ComposeResult<T> = Result<T, ComposeError>;

impl From<ComposeError> for SampleError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::Timeout { timeout, .. } => SampleError::Timeout(timeout),
            ComposeError::Parse(msg) => SampleError::Malformed(msg),
            other => SampleError::Unavailable(other.to_string()),
        }
    }
}

impl From<ComposeError> for ActuateError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::Timeout { timeout, .. } => ActuateError::Timeout(timeout),
            spawn @ ComposeError::Spawn { .. } => ActuateError::Unavailable(spawn.to_string()),
            other => ActuateError::Rejected(other.to_string()),
        }
    }
}
