//! Error types for convergence attempts.
//!
//! Validation and argument errors surface before any external command is
//! issued; command failures surface after the fact with no rollback. No
//! kind is retried internally - every error is terminal for the current
//! convergence attempt.

use thiserror::Error;

/// Coarse error classification, stable across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Precondition or option conflict detected before execution
    Validation,
    /// Malformed input shape (e.g. mismatched sequence lengths)
    InvalidArgument,
    /// Operation rejected (e.g. version pin passed to upgrade)
    Unsupported,
    /// Nonzero exit from a dispatched command
    CommandFailed,
    /// Fatal: the architecture guard could not restore host state
    RedirectionRestore,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Stable lowercase name, used in status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::InvalidArgument => "invalid-argument",
            Self::Unsupported => "unsupported",
            Self::CommandFailed => "command-failed",
            Self::RedirectionRestore => "redirection-restore",
            Self::Other => "other",
        }
    }
}

/// Errors raised while converging a provider.
#[derive(Debug, Error)]
pub enum ConvergeError {
    /// Precondition violated; detected before any command was built.
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong with the declared state
        message: String,
    },

    /// Malformed input shape.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was malformed
        message: String,
    },

    /// The requested operation cannot be performed with these inputs.
    #[error("unsupported operation: {message}")]
    Unsupported {
        /// Why the operation was rejected
        message: String,
    },

    /// A dispatched command or the redirection guard failed.
    #[error(transparent)]
    Exec(#[from] shellkit::Error),

    /// Other provider failure.
    #[error("{0}")]
    Other(String),
}

impl ConvergeError {
    /// Classify this error for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Exec(shellkit::Error::RedirectionRestore { .. }) => ErrorKind::RedirectionRestore,
            Self::Exec(shellkit::Error::CommandFailed { .. } | shellkit::Error::Spawn { .. }) => {
                ErrorKind::CommandFailed
            }
            Self::Exec(shellkit::Error::RedirectionDisable { .. }) | Self::Other(_) => {
                ErrorKind::Other
            }
        }
    }
}

/// Result type for convergence operations.
pub type Result<T> = std::result::Result<T, ConvergeError>;
