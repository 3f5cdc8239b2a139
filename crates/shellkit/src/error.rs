//! Error types for command execution and redirection scoping.

use thiserror::Error;

/// Errors that can occur while running commands or toggling redirection.
#[derive(Debug, Error)]
pub enum Error {
    /// The command could not be spawned at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        /// The command line that could not be started
        command: String,
        /// The underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited nonzero while `raise_on_error` was set.
    #[error("command exited with status {status}: `{command}`")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Exit status reported by the OS (-1 if terminated by signal)
        status: i32,
        /// Captured standard error output
        stderr: String,
    },

    /// File-system redirection could not be disabled.
    #[error("failed to disable file-system redirection: {message}")]
    RedirectionDisable {
        /// OS-level detail of the failure
        message: String,
    },

    /// The prior redirection state could not be restored.
    ///
    /// This is fatal: the host is now in an unknown redirection state.
    /// When the guarded body also failed, its error is preserved in
    /// `body_error` so neither failure is silently dropped.
    #[error("failed to restore file-system redirection: {message}")]
    RedirectionRestore {
        /// OS-level detail of the restore failure
        message: String,
        /// The error the guarded body raised, if it raised one
        body_error: Option<Box<Error>>,
    },
}

/// Result type for shellkit operations.
pub type Result<T> = std::result::Result<T, Error>;
