//! Pinned/unpinned batch partitioning.
//!
//! choco accepts only one version-pinned package per install call, but
//! any number of unpinned names at once. The partitioner splits a
//! declared name/version zip into the two dispatch shapes.

use crate::error::{Error, Result};

/// The two independently dispatchable batches of a package set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitioned {
    /// Targets with an explicit version pin; one invocation each
    pub pinned: Vec<(String, String)>,
    /// Targets without a pin; dispatched as one space-joined call
    pub unpinned: Vec<String>,
}

/// Partition `names` zipped with `versions` by pin presence.
///
/// The sequences must have equal length; a mismatch is a caller error
/// surfaced before anything runs.
pub fn partition(names: &[String], versions: &[Option<String>]) -> Result<Partitioned> {
    if names.len() != versions.len() {
        return Err(Error::LengthMismatch {
            names: names.len(),
            versions: versions.len(),
        });
    }

    let mut result = Partitioned::default();
    for (name, version) in names.iter().zip(versions) {
        match version {
            Some(version) => result.pinned.push((name.clone(), version.clone())),
            None => result.unpinned.push(name.clone()),
        }
    }
    Ok(result)
}

/// Reject any version pin. Upgrade cannot honor pins, and silently
/// ignoring one would converge to the wrong state.
pub fn ensure_unpinned(versions: &[Option<String>]) -> Result<()> {
    if versions.iter().any(Option::is_some) {
        return Err(Error::PinnedUpgrade);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_partition_splits_by_pin() {
        let result = partition(
            &names(&["a", "b", "c"]),
            &[Some("1.0".to_string()), None, Some("2.0".to_string())],
        )
        .unwrap();

        assert_eq!(
            result.pinned,
            vec![
                ("a".to_string(), "1.0".to_string()),
                ("c".to_string(), "2.0".to_string())
            ]
        );
        assert_eq!(result.unpinned, vec!["b"]);
    }

    #[test]
    fn test_partition_preserves_every_input() {
        let input = names(&["a", "b", "c", "d"]);
        let versions = &[None, Some("1.0".to_string()), None, None];
        let result = partition(&input, versions).unwrap();

        // Union by index equals the input, and no pinned entry leaks
        // into the unpinned batch.
        assert_eq!(result.pinned.len() + result.unpinned.len(), input.len());
        for (name, _) in &result.pinned {
            assert!(!result.unpinned.contains(name));
        }
    }

    #[test]
    fn test_partition_rejects_length_mismatch() {
        let err = partition(&names(&["a", "b"]), &[None]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                names: 2,
                versions: 1
            }
        ));
    }

    #[test]
    fn test_ensure_unpinned_accepts_all_none() {
        assert!(ensure_unpinned(&[None, None]).is_ok());
    }

    #[test]
    fn test_ensure_unpinned_rejects_any_pin() {
        let err = ensure_unpinned(&[None, Some("1.0".to_string())]).unwrap_err();
        assert!(matches!(err, Error::PinnedUpgrade));
    }
}
