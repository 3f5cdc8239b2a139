//! Command-line rendering from attribute diffs.

use crate::diff::AttributeDiff;

/// Render a full command line: base command, one ` <flag> '<value>'`
/// fragment per diff entry, then the positional target.
///
/// Flags come from an ordered `(field, flag)` table; diff entries without
/// a flag mapping are skipped. Values are single-quoted as a minimal
/// shell-safety measure - values must not contain embedded single quotes,
/// which are not escaped further.
///
/// Identical inputs always yield byte-identical output; the diff itself
/// carries the sorted-field ordering.
pub fn render_command(
    base: &str,
    diff: &AttributeDiff,
    flags: &[(&str, &str)],
    target: &str,
) -> String {
    let mut command = String::from(base);
    for delta in diff.deltas() {
        if let Some((_, flag)) = flags.iter().find(|(field, _)| *field == delta.field) {
            command.push_str(&format!(" {} '{}'", flag, delta.value));
        }
    }
    command.push(' ');
    command.push_str(target);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: &[(&str, &str)] = &[("gid", "-g")];

    #[test]
    fn test_renders_flag_value_and_target() {
        let mut diff = AttributeDiff::new();
        diff.push("gid", "1001");
        assert_eq!(
            render_command("groupadd", &diff, FLAGS, "mygroup"),
            "groupadd -g '1001' mygroup"
        );
    }

    #[test]
    fn test_empty_diff_renders_base_and_target() {
        let diff = AttributeDiff::new();
        assert_eq!(
            render_command("groupdel", &diff, FLAGS, "mygroup"),
            "groupdel mygroup"
        );
    }

    #[test]
    fn test_unmapped_fields_are_skipped() {
        let mut diff = AttributeDiff::new();
        diff.push("gid", "1001");
        diff.push("shell", "/bin/false");
        assert_eq!(
            render_command("groupmod", &diff, FLAGS, "eng"),
            "groupmod -g '1001' eng"
        );
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let mut diff = AttributeDiff::new();
        diff.push("gid", "1002");
        let first = render_command("groupmod", &diff, FLAGS, "eng");
        let second = render_command("groupmod", &diff, FLAGS, "eng");
        assert_eq!(first, second);
    }
}
