//! Package state types.

use shellkit::Architecture;

/// The declared operation for a package set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAction {
    /// Ensure the packages are installed, honoring version pins
    Install,
    /// Upgrade the packages to their latest candidate (no pins allowed)
    Upgrade,
    /// Uninstall the packages
    Remove,
    /// Uninstall the packages (choco has no separate purge)
    Purge,
}

/// Declared desired state for an ordered set of Chocolatey packages.
///
/// `versions` is parallel to `names`: `names[i]` pairs with
/// `versions[i]`, and a `None` slot means "any version". The two
/// sequences must be the same length; mismatches are rejected before any
/// command is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Package names, in declaration order
    pub names: Vec<String>,
    /// Version pins, parallel to `names`
    pub versions: Vec<Option<String>>,
    /// Extra command-line options passed through to choco
    pub options: Option<String>,
    /// External package source; not supported by this provider and
    /// rejected during validation
    pub source: Option<String>,
    /// What to do with the set
    pub action: PackageAction,
    /// Architecture view to execute under; `None` uses the process default
    pub architecture: Option<Architecture>,
}

impl PackageSpec {
    fn new(names: Vec<String>, action: PackageAction) -> Self {
        let versions = vec![None; names.len()];
        Self {
            names,
            versions,
            options: None,
            source: None,
            action,
            architecture: None,
        }
    }

    /// Packages that should be installed.
    pub fn install(names: Vec<String>) -> Self {
        Self::new(names, PackageAction::Install)
    }

    /// Packages that should be upgraded to their latest candidate.
    pub fn upgrade(names: Vec<String>) -> Self {
        Self::new(names, PackageAction::Upgrade)
    }

    /// Packages that should be removed.
    pub fn remove(names: Vec<String>) -> Self {
        Self::new(names, PackageAction::Remove)
    }

    /// Packages that should be purged (alias for remove under choco).
    pub fn purge(names: Vec<String>) -> Self {
        Self::new(names, PackageAction::Purge)
    }

    /// Replace the version slots wholesale.
    pub fn with_versions(mut self, versions: Vec<Option<String>>) -> Self {
        self.versions = versions;
        self
    }

    /// Pass extra options through to choco.
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Declare an external package source (will fail validation).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Execute under a specific architecture view.
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }
}
