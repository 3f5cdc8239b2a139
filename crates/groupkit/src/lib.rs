//! # groupkit
//!
//! Convergent POSIX group management over the shadow-utils command-line
//! tools.
//!
//! Declare a [`GroupSpec`] (name, optional gid, present/absent), hand a
//! [`GroupProvider`] to the convergence machine, and the provider issues
//! the minimal `groupadd`/`groupmod`/`groupdel` call - or nothing when
//! the host already matches.
//!
//! ```no_run
//! use std::sync::Arc;
//! use groupkit::{GroupProvider, GroupSpec};
//! use shellkit::ShellRunner;
//!
//! let spec = GroupSpec::present("eng").with_gid("1001");
//! let provider = GroupProvider::new(spec, Arc::new(ShellRunner));
//! let outcome = convergence::converge(&provider);
//! assert!(outcome.succeeded());
//! ```

pub mod backend;
pub mod error;
pub mod provider;
pub mod types;

pub use error::{Error, Result};
pub use provider::GroupProvider;
pub use types::{GroupAttrs, GroupEntry, GroupSpec};
