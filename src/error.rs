//! Error types for proc-harness.

use std::time::Duration;

use thiserror::Error;

/// Main error type for proc-harness operations.
#[derive(Error, Debug)]
pub enum ProcHarnessError {
    /// Command line was empty or could not be split into tokens.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Timeout string did not parse as a duration.
    #[error("invalid duration \"{0}\"")]
    DurationParse(String),

    /// The child process could not be launched. The underlying OS error
    /// text is preserved verbatim.
    #[error("failed to launch command: {0}")]
    Launch(#[source] std::io::Error),

    /// A bounded-timeout run hit its deadline before the child exited.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

impl ProcHarnessError {
    /// Conventional exit status for this error.
    ///
    /// Launch failures map to 127 (command-not-found convention), timeouts
    /// to 124 as the coreutils `timeout` tool reports them, and construction
    /// errors to the usage-error status 2.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Launch(_) => 127,
            Self::Timeout(_) => 124,
            Self::InvalidCommand(_) | Self::DurationParse(_) => 2,
        }
    }
}

/// Convenience Result type for proc-harness operations.
pub type Result<T> = std::result::Result<T, ProcHarnessError>;
