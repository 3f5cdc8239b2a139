use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest location under the user config dir.
pub fn default_manifest_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("steward").join("steward.toml"))
}

/// The declared desired state: groups and packages.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared groups
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupDecl>,

    /// Declared packages
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageDecl>,
}

/// Whether a declared object should exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnsureDecl {
    #[default]
    Present,
    Absent,
}

/// One `[[group]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDecl {
    pub name: String,
    /// Desired gid; omitted means "leave as-is"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<String>,
    #[serde(default)]
    pub ensure: EnsureDecl,
}

/// Package operation declared in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionDecl {
    #[default]
    Install,
    Upgrade,
    Remove,
    Purge,
}

/// One `[[package]]` entry.
///
/// Entries sharing the same action, options, source, and architecture are
/// batched into one provider, so declaring packages one per entry still
/// converges with the minimal number of choco calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDecl {
    pub name: String,
    /// Version pin; omitted means "any version"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub action: ActionDecl,
    /// Extra options passed through to choco
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// External package source (not supported; fails validation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Architecture view to execute under ("x86_64" or "x86")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

impl Manifest {
    /// Load the manifest from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Save the manifest to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.packages.is_empty()
    }
}
