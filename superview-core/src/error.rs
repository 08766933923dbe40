// ============================================================================
// superview-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for superview-core
//
// Every failure in a run is terminal: there is no retry policy and no partial
// success. The variants below map one-to-one onto the stages that can fail
// (toolchain discovery, probing, map file output, encoding) plus the
// user-initiated cancellation path.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Custom error type for superview-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Cannot find {0} on your system. Make sure to install it first")]
    ToolchainNotFound(String),

    #[error("Probing input failed: {0}")]
    ProbeFailed(String),

    #[error("Map file I/O failed for '{}': {source}", path.display())]
    FileIoFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start ffmpeg: {0}")]
    EncodeSpawnFailed(String),

    #[error("{command} exited with {status}, output is:\n{output}")]
    EncodeFailed {
        command: String,
        status: ExitStatus,
        output: String,
    },

    #[error("Encode cancelled by user")]
    Cancelled,

    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Returns `true` when the run ended because the user interrupted it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}

/// Result type alias for superview-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds the error for a command that ran but exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl fmt::Display,
    status: ExitStatus,
    output: impl Into<String>,
) -> CoreError {
    CoreError::EncodeFailed {
        command: cmd.to_string(),
        status,
        output: output.into(),
    }
}
