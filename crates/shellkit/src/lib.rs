//! # shellkit
//!
//! Command execution with captured output, plus architecture-scoped
//! file-system redirection for dual-architecture hosts.
//!
//! This crate provides:
//! - A [`CommandRunner`] trait over "run this command line, capture
//!   stdout/stderr/exit status", with a real shell-backed implementation
//!   ([`ShellRunner`]) and a replaying one for tests ([`RecordingRunner`])
//! - An [`ArchContext`] guard that runs a closure under a specific CPU
//!   architecture view, disabling OS file-system redirection for the
//!   duration of the call and restoring it on every exit path
//!
//! ## Example
//!
//! ```no_run
//! use shellkit::{CommandRunner, CommandSpec, ShellRunner};
//!
//! let runner = ShellRunner;
//! let result = runner.run(&CommandSpec::checked("getent group wheel")).unwrap();
//! println!("{}", result.stdout_str());
//! ```
//!
//! ## Architecture scoping
//!
//! A 32-bit process on a 64-bit Windows host sees system paths through the
//! WoW64 redirector. To address the native location, redirection must be
//! disabled around the call and restored afterwards - leaving it disabled
//! is a host-wide bug. [`ArchContext::with_architecture`] owns that
//! bracket; see [`redirect`] for the details.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arch;
pub mod error;
pub mod redirect;
pub mod runner;

pub use arch::{Architecture, HostArchitecture};
pub use error::{Error, Result};
pub use redirect::{ArchContext, RedirectionControl, RedirectionToken, VirtualRedirection};
pub use runner::{CommandRunner, CommandSpec, ExecutionResult, RecordingRunner, ShellRunner};

#[cfg(windows)]
pub use redirect::Wow64Redirection;
