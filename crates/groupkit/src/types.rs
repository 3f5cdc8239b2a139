//! Group state types.

use convergence::Presence;

/// Declared desired state for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Group name, the positional target of every command
    pub name: String,
    /// Desired numeric gid; `None` leaves the host value as-is
    pub gid: Option<String>,
    /// Whether the group should exist
    pub ensure: Presence,
}

impl GroupSpec {
    /// A group that should exist.
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gid: None,
            ensure: Presence::Present,
        }
    }

    /// A group that should not exist.
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gid: None,
            ensure: Presence::Absent,
        }
    }

    /// Pin the gid.
    pub fn with_gid(mut self, gid: impl Into<String>) -> Self {
        self.gid = Some(gid.into());
        self
    }
}

/// The attributes that participate in diffing.
///
/// Both the declared and the observed side project into this shape; an
/// unknown observed field is `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttrs {
    /// Numeric gid as a string (commands take it verbatim)
    pub gid: Option<String>,
}

/// One group database entry as reported by getent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    /// Group name
    pub name: String,
    /// Numeric gid
    pub gid: String,
    /// Member user names
    pub members: Vec<String>,
}

impl GroupEntry {
    /// Project the entry onto the diffable attribute set.
    pub fn attrs(&self) -> GroupAttrs {
        GroupAttrs {
            gid: Some(self.gid.clone()),
        }
    }
}
