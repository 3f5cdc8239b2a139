//! Error types for Chocolatey operations.

use convergence::ConvergeError;
use thiserror::Error;

/// Errors that can occur while managing Chocolatey packages.
#[derive(Debug, Error)]
pub enum Error {
    /// The names and versions sequences have different lengths.
    #[error("got {names} package names but {versions} versions")]
    LengthMismatch {
        /// Number of declared names
        names: usize,
        /// Number of declared version slots
        versions: usize,
    },

    /// A version pin was passed to upgrade, which choco cannot honor.
    #[error("version pins are not supported on upgrade, use install instead")]
    PinnedUpgrade,

    /// The provider cannot handle an external package source.
    #[error("the chocolatey provider cannot handle a package source")]
    SourceNotSupported,

    /// The Chocolatey install location could not be determined.
    #[error("chocolatey install location not found (is ChocolateyInstall set?)")]
    ChocoNotFound,

    /// A choco or powershell invocation failed.
    #[error("chocolatey operation failed: {0}")]
    Operation(#[from] shellkit::Error),
}

impl From<Error> for ConvergeError {
    fn from(err: Error) -> Self {
        match err {
            Error::LengthMismatch { .. } => ConvergeError::InvalidArgument {
                message: err.to_string(),
            },
            Error::PinnedUpgrade => ConvergeError::Unsupported {
                message: err.to_string(),
            },
            Error::SourceNotSupported => ConvergeError::Validation {
                message: err.to_string(),
            },
            Error::ChocoNotFound => ConvergeError::Other(err.to_string()),
            Error::Operation(e) => ConvergeError::Exec(e),
        }
    }
}

/// Result type for Chocolatey operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use convergence::ErrorKind;

    #[test]
    fn test_error_kinds_map_to_spec_kinds() {
        let kind = |e: Error| ConvergeError::from(e).kind();

        assert_eq!(
            kind(Error::LengthMismatch {
                names: 2,
                versions: 1
            }),
            ErrorKind::InvalidArgument
        );
        assert_eq!(kind(Error::PinnedUpgrade), ErrorKind::Unsupported);
        assert_eq!(kind(Error::SourceNotSupported), ErrorKind::Validation);
    }
}
