//! Group database lookup through getent.

use crate::error::{Error, Result};
use crate::types::GroupEntry;
use shellkit::{CommandRunner, CommandSpec};

/// Look a group up in the host's group database.
///
/// A lookup miss (getent exits 2) is `Ok(None)`; only malformed output or
/// a failure to run getent at all is an error.
pub fn lookup(runner: &dyn CommandRunner, name: &str) -> Result<Option<GroupEntry>> {
    let result = runner.run(&CommandSpec::new(format!("getent group {name}")))?;
    if !result.success() {
        log::debug!("group {name} not in the group database");
        return Ok(None);
    }

    let stdout = result.stdout_str();
    let line = stdout.trim();
    if line.is_empty() {
        return Ok(None);
    }
    parse_entry(line).map(Some)
}

/// Parse one `name:passwd:gid:members` line.
fn parse_entry(line: &str) -> Result<GroupEntry> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 3 {
        return Err(Error::UnexpectedOutput {
            line: line.to_string(),
        });
    }

    let members = fields
        .get(3)
        .map(|m| {
            m.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(GroupEntry {
        name: fields[0].to_string(),
        gid: fields[2].to_string(),
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellkit::{ExecutionResult, RecordingRunner};

    #[test]
    fn test_parse_entry_with_members() {
        let entry = parse_entry("eng:x:1001:alice,bob").unwrap();
        assert_eq!(entry.name, "eng");
        assert_eq!(entry.gid, "1001");
        assert_eq!(entry.members, vec!["alice", "bob"]);
    }

    #[test]
    fn test_parse_entry_without_members() {
        let entry = parse_entry("eng:x:1001:").unwrap();
        assert!(entry.members.is_empty());
    }

    #[test]
    fn test_parse_entry_rejects_garbage() {
        assert!(parse_entry("not a group line").is_err());
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let runner =
            RecordingRunner::new().respond("getent group nosuch", ExecutionResult::failed(2, ""));
        assert!(lookup(&runner, "nosuch").unwrap().is_none());
    }

    #[test]
    fn test_lookup_hit_parses_entry() {
        let runner = RecordingRunner::new()
            .respond("getent group eng", ExecutionResult::succeeded("eng:x:1000:\n"));
        let entry = lookup(&runner, "eng").unwrap().unwrap();
        assert_eq!(entry.gid, "1000");
    }
}
