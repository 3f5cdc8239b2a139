//! The provider state machine.
//!
//! One convergence attempt is a linear pass:
//! `Unloaded -> Loaded -> {NoOp, Create, Modify, Remove} -> Done`.
//! The machine validates, observes, selects exactly one action, applies
//! it, and halts at its current phase on failure - retries belong to the
//! caller, never here.

use crate::error::Result;
use crate::provider::{Observation, Provider};
use crate::types::{ConvergeAction, ConvergeOutcome, Presence};

/// Phase of a convergence attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Current state not yet fetched
    Unloaded,
    /// Current state observed, action not yet selected
    Loaded,
    /// Applying the selected action
    Acting(ConvergeAction),
    /// Attempt finished successfully
    Done,
}

/// Drives one provider through a single convergence attempt.
#[derive(Debug)]
pub struct Machine {
    phase: Phase,
}

impl Machine {
    /// A machine in the initial phase.
    pub fn new() -> Self {
        Self {
            phase: Phase::Unloaded,
        }
    }

    /// The phase the machine currently sits at. After a failure this is
    /// the phase the attempt halted in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run one convergence attempt.
    ///
    /// Validation and observation failures return before any command has
    /// been issued; action failures halt the machine at `Acting(_)`.
    pub fn converge(&mut self, provider: &dyn Provider) -> ConvergeOutcome {
        if let Err(e) = provider.validate() {
            return ConvergeOutcome::failed(ConvergeAction::NoOp, e);
        }

        let observation = match provider.observe() {
            Ok(observation) => observation,
            Err(e) => return ConvergeOutcome::failed(ConvergeAction::NoOp, e),
        };
        self.phase = Phase::Loaded;

        let action = select_action(provider.desired_presence(), &observation);
        self.phase = Phase::Acting(action);
        log::debug!(
            "{} {}: {}",
            provider.provider_type(),
            provider.id(),
            action.as_str()
        );

        let applied = match action {
            ConvergeAction::NoOp => Ok(()),
            ConvergeAction::Create => provider.create(),
            ConvergeAction::Modify => provider.modify(&observation.diff),
            ConvergeAction::Remove => provider.remove(),
        };

        match applied {
            Ok(()) => {
                self.phase = Phase::Done;
                ConvergeOutcome::applied(action)
            }
            Err(e) => ConvergeOutcome::failed(action, e),
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

/// Select the single action that converges `observation` toward the
/// desired presence.
fn select_action(desired: Presence, observation: &Observation) -> ConvergeAction {
    match (desired, observation.presence) {
        (Presence::Absent, Presence::Present) => ConvergeAction::Remove,
        (Presence::Absent, Presence::Absent) => ConvergeAction::NoOp,
        (Presence::Present, Presence::Absent) => ConvergeAction::Create,
        (Presence::Present, Presence::Present) => {
            if observation.diff.is_empty() {
                ConvergeAction::NoOp
            } else {
                ConvergeAction::Modify
            }
        }
    }
}

/// Run one convergence attempt on a fresh machine.
pub fn converge(provider: &dyn Provider) -> ConvergeOutcome {
    Machine::new().converge(provider)
}

/// Select the action a convergence attempt would take, without applying
/// anything.
pub fn plan(provider: &dyn Provider) -> Result<ConvergeAction> {
    provider.validate()?;
    let observation = provider.observe()?;
    Ok(select_action(provider.desired_presence(), &observation))
}
