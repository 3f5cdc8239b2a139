//! Convergent group provider.
//!
//! Command shapes follow the shadow-utils tools: `groupadd` with option
//! flags for create, `groupmod` for attribute changes, bare `groupdel`
//! for removal. Options are rendered only for attributes that actually
//! differ, so a converged group issues nothing.

use crate::backend;
use crate::types::{GroupAttrs, GroupSpec};
use convergence::{
    diff_attributes, render_command, AttributeDiff, FieldSpec, Observation, Presence, Provider,
    Result,
};
use shellkit::CommandRunner;
use std::fmt;
use std::sync::Arc;

/// Attributes tracked for groups. Extending the provider to more
/// groupmod options means one more row here and in [`GROUP_FLAGS`].
const GROUP_FIELDS: &[FieldSpec<GroupAttrs>] = &[FieldSpec {
    name: "gid",
    read: |attrs| attrs.gid.clone(),
}];

/// Field-to-flag mapping for groupadd/groupmod.
const GROUP_FLAGS: &[(&str, &str)] = &[("gid", "-g")];

/// Converges one POSIX group toward its declared state.
pub struct GroupProvider {
    spec: GroupSpec,
    runner: Arc<dyn CommandRunner>,
}

impl GroupProvider {
    /// Build a provider for `spec`, dispatching through `runner`.
    pub fn new(spec: GroupSpec, runner: Arc<dyn CommandRunner>) -> Self {
        Self { spec, runner }
    }

    fn desired_attrs(&self) -> GroupAttrs {
        GroupAttrs {
            gid: self.spec.gid.clone(),
        }
    }
}

impl fmt::Debug for GroupProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupProvider")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Provider for GroupProvider {
    fn id(&self) -> String {
        self.spec.name.clone()
    }

    fn description(&self) -> String {
        match self.spec.ensure {
            Presence::Present => format!("group {} present", self.spec.name),
            Presence::Absent => format!("group {} absent", self.spec.name),
        }
    }

    fn provider_type(&self) -> &'static str {
        "group"
    }

    fn desired_presence(&self) -> Presence {
        self.spec.ensure
    }

    fn observe(&self) -> Result<Observation> {
        let entry = backend::lookup(self.runner.as_ref(), &self.spec.name)
            .map_err(convergence::ConvergeError::from)?;

        Ok(match entry {
            None => Observation::absent(),
            Some(entry) => {
                let diff = diff_attributes(&self.desired_attrs(), &entry.attrs(), GROUP_FIELDS);
                Observation::present(diff)
            }
        })
    }

    fn create(&self) -> Result<()> {
        // A nonexistent group has every attribute absent, so the diff is
        // exactly the declared option set.
        let diff = diff_attributes(&self.desired_attrs(), &GroupAttrs::default(), GROUP_FIELDS);
        let command = render_command("groupadd", &diff, GROUP_FLAGS, &self.spec.name);
        self.runner.run_checked(&command)?;
        Ok(())
    }

    fn modify(&self, diff: &AttributeDiff) -> Result<()> {
        let command = render_command("groupmod", diff, GROUP_FLAGS, &self.spec.name);
        self.runner.run_checked(&command)?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        self.runner
            .run_checked(&format!("groupdel {}", self.spec.name))?;
        Ok(())
    }
}
