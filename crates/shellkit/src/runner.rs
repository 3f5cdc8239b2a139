//! Command dispatch with captured output.
//!
//! Commands are rendered as full command-line strings upstream and handed
//! to a [`CommandRunner`]. The runner blocks for the process's full
//! lifetime and captures output only after it exits - no streaming.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::process::Command;
use std::sync::Mutex;

/// A single command invocation: the command line plus whether a nonzero
/// exit should be raised as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The full command line, dispatched through the platform shell
    pub command_line: String,
    /// When set, a nonzero exit status becomes [`Error::CommandFailed`]
    pub raise_on_error: bool,
}

impl CommandSpec {
    /// A command whose exit status is reported but never raised.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            raise_on_error: false,
        }
    }

    /// A command that fails the call on nonzero exit.
    pub fn checked(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            raise_on_error: true,
        }
    }
}

/// Captured output of a finished command. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    status: i32,
}

impl ExecutionResult {
    /// Build a result from raw captured streams and an exit status.
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, status: i32) -> Self {
        Self {
            stdout,
            stderr,
            status,
        }
    }

    /// A successful result carrying the given stdout text.
    pub fn succeeded(stdout: &str) -> Self {
        Self::new(stdout.as_bytes().to_vec(), Vec::new(), 0)
    }

    /// A failed result with the given status and stderr text.
    pub fn failed(status: i32, stderr: &str) -> Self {
        Self::new(Vec::new(), stderr.as_bytes().to_vec(), status)
    }

    /// Captured standard output as a lossy string.
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Captured standard error as a lossy string.
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// The exit status (-1 when the process was terminated by a signal).
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Whether the command exited zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Executes external command lines and captures their output.
///
/// The trait is the seam between convergence logic and the host: real
/// code uses [`ShellRunner`], tests use [`RecordingRunner`].
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output.
    fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult>;

    /// Run a command, raising [`Error::CommandFailed`] on nonzero exit.
    fn run_checked(&self, command_line: &str) -> Result<ExecutionResult> {
        self.run(&CommandSpec::checked(command_line))
    }
}

/// Runner that dispatches through the platform shell.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        log::debug!("running `{}`", spec.command_line);

        let output = shell_command(&spec.command_line)
            .output()
            .map_err(|e| Error::Spawn {
                command: spec.command_line.clone(),
                source: e,
            })?;

        let result = ExecutionResult::new(
            output.stdout,
            output.stderr,
            output.status.code().unwrap_or(-1),
        );

        if spec.raise_on_error && !result.success() {
            return Err(Error::CommandFailed {
                command: spec.command_line.clone(),
                status: result.status(),
                stderr: result.stderr_str().trim().to_string(),
            });
        }

        Ok(result)
    }
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command_line]);
    cmd
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command_line]);
    cmd
}

/// Runner that records every dispatched command line and replays canned
/// results. Useful for testing convergence flows without touching the host.
///
/// Commands without a canned response succeed with empty output.
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    responses: Mutex<HashMap<String, ExecutionResult>>,
}

impl RecordingRunner {
    /// A runner where every command succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned result for an exact command line.
    pub fn respond(self, command_line: &str, result: ExecutionResult) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(command_line.to_string(), result);
        self
    }

    /// Every command line dispatched so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        self.commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(spec.command_line.clone());

        let result = self
            .responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&spec.command_line)
            .cloned()
            .unwrap_or_else(|| ExecutionResult::succeeded(""));

        if spec.raise_on_error && !result.success() {
            return Err(Error::CommandFailed {
                command: spec.command_line.clone(),
                status: result.status(),
                stderr: result.stderr_str().trim().to_string(),
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_result_accessors() {
        let result = ExecutionResult::new(b"out".to_vec(), b"err".to_vec(), 0);
        assert_eq!(result.stdout_str(), "out");
        assert_eq!(result.stderr_str(), "err");
        assert!(result.success());
        assert_eq!(result.status(), 0);
    }

    #[test]
    fn test_recording_runner_records_in_order() {
        let runner = RecordingRunner::new();
        runner.run(&CommandSpec::new("first")).unwrap();
        runner.run(&CommandSpec::new("second")).unwrap();
        assert_eq!(runner.commands(), vec!["first", "second"]);
    }

    #[test]
    fn test_recording_runner_replays_canned_result() {
        let runner =
            RecordingRunner::new().respond("getent group eng", ExecutionResult::succeeded("eng:x:1000:\n"));
        let result = runner.run(&CommandSpec::new("getent group eng")).unwrap();
        assert_eq!(result.stdout_str(), "eng:x:1000:\n");
    }

    #[test]
    fn test_recording_runner_raises_on_canned_failure() {
        let runner = RecordingRunner::new().respond("groupdel eng", ExecutionResult::failed(8, "busy"));
        let err = runner.run(&CommandSpec::checked("groupdel eng")).unwrap_err();
        match err {
            Error::CommandFailed { status, stderr, .. } => {
                assert_eq!(status, 8);
                assert_eq!(stderr, "busy");
            }
            _ => panic!("expected CommandFailed"),
        }
    }

    #[test]
    fn test_unchecked_failure_is_returned_not_raised() {
        let runner = RecordingRunner::new().respond("choco list -r", ExecutionResult::failed(1, ""));
        let result = runner.run(&CommandSpec::new("choco list -r")).unwrap();
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_captures_stdout() {
        let runner = ShellRunner;
        let result = runner.run(&CommandSpec::new("echo converged")).unwrap();
        assert_eq!(result.stdout_str().trim(), "converged");
        assert!(result.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_checked_raises_on_nonzero() {
        let runner = ShellRunner;
        let err = runner.run_checked("exit 3").unwrap_err();
        match err {
            Error::CommandFailed { status, .. } => assert_eq!(status, 3),
            _ => panic!("expected CommandFailed"),
        }
    }
}
