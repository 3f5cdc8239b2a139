//! # chocokit
//!
//! Convergent Chocolatey package management.
//!
//! A [`PackageSpec`] declares an ordered list of package names, optionally
//! zipped with version pins, plus an action (install, upgrade, remove,
//! purge). The [`PackageProvider`] observes the installed set, partitions
//! unsatisfied targets into pinned and unpinned batches - choco cannot
//! batch-install multiple pinned versions in one call - and issues the
//! minimal set of `choco` invocations.
//!
//! All dispatch goes through an architecture context: on a 64-bit host a
//! WoW64 process must disable file-system redirection to address the
//! native Chocolatey install, and the guard restores the prior state on
//! every exit path.
//!
//! ```no_run
//! use std::sync::Arc;
//! use chocokit::{ChocoClient, PackageProvider, PackageSpec};
//! use shellkit::{ArchContext, ShellRunner, VirtualRedirection};
//!
//! let arch = ArchContext::detect(Arc::new(VirtualRedirection::new()));
//! let client = ChocoClient::new(Arc::new(ShellRunner), arch);
//! let spec = PackageSpec::install(vec!["git".to_string()]);
//! let outcome = convergence::converge(&PackageProvider::new(spec, client));
//! ```

pub mod backend;
pub mod error;
pub mod partition;
pub mod powershell;
pub mod provider;
pub mod types;

pub use backend::ChocoClient;
pub use error::{Error, Result};
pub use partition::{ensure_unpinned, partition, Partitioned};
pub use provider::PackageProvider;
pub use types::{PackageAction, PackageSpec};
