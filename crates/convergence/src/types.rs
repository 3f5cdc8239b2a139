//! Core types for convergent resource management.

use crate::error::ConvergeError;
use serde::{Deserialize, Serialize};

/// Whether a managed object exists on the host (or should).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// The object exists / should exist
    Present,
    /// The object does not exist / should be removed
    Absent,
}

impl Presence {
    /// Check if this is the present state.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

/// The action a convergence attempt selected for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergeAction {
    /// Already converged; zero commands issued
    NoOp,
    /// The object was absent and desired present
    Create,
    /// The object exists but tracked attributes differ
    Modify,
    /// The object exists and is desired absent
    Remove,
}

impl ConvergeAction {
    /// Whether this action changes the host.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Remove => "remove",
        }
    }
}

/// Result of one convergence attempt.
#[derive(Debug)]
pub struct ConvergeOutcome {
    /// The action that was selected (and attempted, unless validation or
    /// observation failed first)
    pub action: ConvergeAction,
    /// The terminal error, if the attempt failed
    pub error: Option<ConvergeError>,
}

impl ConvergeOutcome {
    /// A successful outcome for `action`.
    pub fn applied(action: ConvergeAction) -> Self {
        Self {
            action,
            error: None,
        }
    }

    /// A failed outcome: the machine halted with `error`.
    pub fn failed(action: ConvergeAction, error: ConvergeError) -> Self {
        Self {
            action,
            error: Some(error),
        }
    }

    /// Whether the attempt completed without error.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of outcomes across a batch of providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvergeSummary {
    /// Providers already converged
    pub no_op: usize,
    /// Objects created
    pub created: usize,
    /// Objects modified
    pub modified: usize,
    /// Objects removed
    pub removed: usize,
    /// Attempts that failed
    pub failed: usize,
}

impl ConvergeSummary {
    /// Fold one outcome into the summary.
    pub fn add_outcome(&mut self, outcome: &ConvergeOutcome) {
        if !outcome.succeeded() {
            self.failed += 1;
            return;
        }
        match outcome.action {
            ConvergeAction::NoOp => self.no_op += 1,
            ConvergeAction::Create => self.created += 1,
            ConvergeAction::Modify => self.modified += 1,
            ConvergeAction::Remove => self.removed += 1,
        }
    }

    /// Total number of actual changes made.
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// Check if the batch was fully successful.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of providers processed.
    pub fn total(&self) -> usize {
        self.no_op + self.created + self.modified + self.removed + self.failed
    }
}
