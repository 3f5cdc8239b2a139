//! # Convergence
//!
//! A framework for convergent resource providers.
//!
//! A provider declares a *desired* state for one system object (a group, a
//! set of packages), observes the *current* state on the host, and applies
//! the minimal set of idempotent external commands to reconcile the two.
//! When the host already matches, nothing runs.
//!
//! ## Core Concepts
//!
//! - **Provider**: one managed object kind with desired state attached
//! - **Observation**: the host's current state plus the attribute diff
//! - **Machine**: the `Unloaded -> Loaded -> action -> Done` driver that
//!   selects and applies create/modify/remove/no-op
//! - **AttributeDiff**: the ordered set of fields whose desired value
//!   differs from the observed one
//!
//! ## Example
//!
//! ```ignore
//! use convergence::{converge, Provider};
//!
//! let provider = GroupProvider::new(spec, runner);
//! let outcome = converge(&provider);
//! if outcome.succeeded() {
//!     println!("{:?}", outcome.action);
//! }
//! ```
//!
//! Providers hold their collaborators (command runner, architecture
//! context) by composition; the machine never touches the host directly.

pub mod cmdline;
pub mod diff;
pub mod error;
pub mod machine;
pub mod provider;
pub mod types;

pub use cmdline::render_command;
pub use diff::{diff_attributes, AttributeDelta, AttributeDiff, FieldSpec};
pub use error::{ConvergeError, ErrorKind, Result};
pub use machine::{converge, plan, Machine, Phase};
pub use provider::{BoxedProvider, Observation, Provider};
pub use types::{ConvergeAction, ConvergeOutcome, ConvergeSummary, Presence};
