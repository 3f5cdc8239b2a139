//! Provider trait for convergent resources.
//!
//! A provider binds one managed object kind to its desired state and its
//! collaborators (command runner, architecture context). The machine in
//! [`crate::machine`] drives it; providers never select their own action.

use crate::diff::AttributeDiff;
use crate::error::Result;
use crate::types::Presence;
use std::fmt;

/// The host's current state for one provider, as observed at the start of
/// a convergence attempt.
#[derive(Debug)]
pub struct Observation {
    /// Whether the managed object exists on the host
    pub presence: Presence,
    /// Fields whose desired value differs from the observed one; empty
    /// when the object is absent or already converged
    pub diff: AttributeDiff,
}

impl Observation {
    /// An observation of an absent object.
    pub fn absent() -> Self {
        Self {
            presence: Presence::Absent,
            diff: AttributeDiff::new(),
        }
    }

    /// An observation of a present object with the given diff.
    pub fn present(diff: AttributeDiff) -> Self {
        Self {
            presence: Presence::Present,
            diff,
        }
    }
}

/// One convergent resource: desired state plus the operations that move
/// the host toward it.
///
/// Implementations hold their collaborators by composition and route all
/// host access through them:
///
/// - `validate` runs before anything else; a failure here guarantees zero
///   commands were issued
/// - `observe` loads current state; absent objects are observations, not
///   errors
/// - `create`/`modify`/`remove` each issue the already-minimal commands
///   for their action and are only called when the machine selected them
pub trait Provider: Send + Sync + fmt::Debug {
    /// Unique identifier for the managed object (e.g. a group name).
    fn id(&self) -> String;

    /// Human-readable description of what converging does.
    fn description(&self) -> String;

    /// Provider category (e.g. "group", "chocolatey_package").
    fn provider_type(&self) -> &'static str;

    /// Check declared-state preconditions. Failures surface as
    /// validation errors before any command is built.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Whether the declared state wants the object present or absent.
    fn desired_presence(&self) -> Presence;

    /// Observe the host's current state and diff it against desired.
    fn observe(&self) -> Result<Observation>;

    /// Bring an absent object into existence.
    fn create(&self) -> Result<()>;

    /// Reconcile the differing attributes of an existing object.
    fn modify(&self, diff: &AttributeDiff) -> Result<()>;

    /// Remove an existing object.
    fn remove(&self) -> Result<()>;
}

/// A boxed provider for heterogeneous batches.
pub type BoxedProvider = Box<dyn Provider>;
