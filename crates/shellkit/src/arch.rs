//! CPU architecture views on a dual-architecture host.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A target architecture view for command execution.
///
/// On a 64-bit Windows host a command can run under the native 64-bit view
/// or the 32-bit emulated (WoW64) view; the two see different file-system
/// paths for system locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// Native 64-bit
    X86_64,
    /// 32-bit, emulated on a 64-bit host
    X86,
}

impl Architecture {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::X86 => "x86",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(Self::X86_64),
            "x86" | "i386" | "i686" => Ok(Self::X86),
            other => Err(format!("unknown architecture: {other}")),
        }
    }
}

/// The host's architecture as seen by this process.
///
/// `native` is the hardware view; `process` is the view this process runs
/// under. They differ exactly when the process is emulated (a 32-bit
/// process under WoW64).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostArchitecture {
    native: Architecture,
    process: Architecture,
}

impl HostArchitecture {
    /// Build a host description explicitly. Intended for tests and for
    /// callers that already queried the host elsewhere.
    pub fn new(native: Architecture, process: Architecture) -> Self {
        Self { native, process }
    }

    /// Detect the architecture of the current host and process.
    ///
    /// A 32-bit process on 64-bit Windows is recognized by the
    /// `PROCESSOR_ARCHITEW6432` environment variable, which WoW64 sets to
    /// the native architecture.
    pub fn detect() -> Self {
        let process = match std::env::consts::ARCH {
            "x86" => Architecture::X86,
            _ => Architecture::X86_64,
        };

        let native = if process == Architecture::X86
            && std::env::var_os("PROCESSOR_ARCHITEW6432").is_some()
        {
            Architecture::X86_64
        } else {
            process
        };

        Self { native, process }
    }

    /// The hardware architecture.
    pub fn native(&self) -> Architecture {
        self.native
    }

    /// The view this process executes under.
    pub fn process(&self) -> Architecture {
        self.process
    }

    /// Whether this process runs under an emulated view.
    pub fn is_emulated(&self) -> bool {
        self.process != self.native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_architecture_aliases() {
        assert_eq!("x86_64".parse::<Architecture>().unwrap(), Architecture::X86_64);
        assert_eq!("amd64".parse::<Architecture>().unwrap(), Architecture::X86_64);
        assert_eq!("i386".parse::<Architecture>().unwrap(), Architecture::X86);
        assert!("sparc".parse::<Architecture>().is_err());
    }

    #[test]
    fn test_native_host_is_not_emulated() {
        let host = HostArchitecture::new(Architecture::X86_64, Architecture::X86_64);
        assert!(!host.is_emulated());
    }

    #[test]
    fn test_wow64_host_is_emulated() {
        let host = HostArchitecture::new(Architecture::X86_64, Architecture::X86);
        assert!(host.is_emulated());
        assert_eq!(host.native(), Architecture::X86_64);
        assert_eq!(host.process(), Architecture::X86);
    }

    #[test]
    fn test_detect_returns_consistent_views() {
        let host = HostArchitecture::detect();
        if !host.is_emulated() {
            assert_eq!(host.native(), host.process());
        }
    }
}
