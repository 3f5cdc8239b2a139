//! Error types for group operations.

use convergence::ConvergeError;
use thiserror::Error;

/// Errors that can occur while managing groups.
#[derive(Debug, Error)]
pub enum Error {
    /// A groupadd/groupmod/groupdel/getent invocation failed.
    #[error("group operation failed: {0}")]
    Operation(#[from] shellkit::Error),

    /// getent produced something that does not parse as a group entry.
    #[error("unexpected getent output: {line}")]
    UnexpectedOutput {
        /// The offending output line
        line: String,
    },
}

impl From<Error> for ConvergeError {
    fn from(err: Error) -> Self {
        match err {
            Error::Operation(e) => ConvergeError::Exec(e),
            Error::UnexpectedOutput { .. } => ConvergeError::Other(err.to_string()),
        }
    }
}

/// Result type for group operations.
pub type Result<T> = std::result::Result<T, Error>;
