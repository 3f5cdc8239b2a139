//! Convergent Chocolatey package provider.
//!
//! The diff treats each declared package as one field: the name, paired
//! with the version that should end up installed (the pin, or the
//! candidate from the feed). Only unsatisfied targets are dispatched, so
//! a converged set issues no install commands at all.

use crate::backend::ChocoClient;
use crate::error::Error;
use crate::partition::{ensure_unpinned, partition};
use crate::types::{PackageAction, PackageSpec};
use convergence::{
    AttributeDiff, ConvergeError, Observation, Presence, Provider, Result,
};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Converges a declared package set toward its desired state.
pub struct PackageProvider {
    spec: PackageSpec,
    client: ChocoClient,
}

impl PackageProvider {
    /// Build a provider for `spec` over `client`.
    pub fn new(spec: PackageSpec, client: ChocoClient) -> Self {
        Self { spec, client }
    }

    /// Dispatch the declared action for the subset of targets in `keep`
    /// (all targets when `None`).
    fn converge_targets(&self, keep: Option<&HashSet<String>>) -> crate::error::Result<()> {
        let mut names = Vec::new();
        let mut versions = Vec::new();
        for (name, version) in self.spec.names.iter().zip(&self.spec.versions) {
            if keep.is_none_or(|k| k.contains(name)) {
                names.push(name.clone());
                versions.push(version.clone());
            }
        }

        let options = self.spec.options.as_deref();
        match self.spec.action {
            PackageAction::Install => {
                let targets = partition(&names, &versions)?;
                self.client.install(&targets, options)
            }
            PackageAction::Upgrade => self.client.upgrade(&names, &versions, options),
            PackageAction::Remove | PackageAction::Purge => {
                self.client.uninstall(&names, options)
            }
        }
    }
}

impl fmt::Debug for PackageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageProvider")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Provider for PackageProvider {
    fn id(&self) -> String {
        self.spec.names.join(", ")
    }

    fn description(&self) -> String {
        let verb = match self.spec.action {
            PackageAction::Install => "install",
            PackageAction::Upgrade => "upgrade",
            PackageAction::Remove => "remove",
            PackageAction::Purge => "purge",
        };
        format!("{} chocolatey packages {}", verb, self.id())
    }

    fn provider_type(&self) -> &'static str {
        "chocolatey_package"
    }

    fn validate(&self) -> Result<()> {
        if self.spec.source.is_some() {
            return Err(Error::SourceNotSupported.into());
        }
        if self.spec.names.len() != self.spec.versions.len() {
            return Err(Error::LengthMismatch {
                names: self.spec.names.len(),
                versions: self.spec.versions.len(),
            }
            .into());
        }
        if self.spec.action == PackageAction::Upgrade {
            ensure_unpinned(&self.spec.versions).map_err(ConvergeError::from)?;
        }
        Ok(())
    }

    fn desired_presence(&self) -> Presence {
        match self.spec.action {
            PackageAction::Install | PackageAction::Upgrade => Presence::Present,
            PackageAction::Remove | PackageAction::Purge => Presence::Absent,
        }
    }

    fn observe(&self) -> Result<Observation> {
        let installed = self
            .client
            .installed_packages()
            .map_err(ConvergeError::from)?;

        let any_installed = self
            .spec
            .names
            .iter()
            .any(|name| installed.contains_key(name));

        // name -> target version; BTreeMap keeps the diff name-sorted.
        let mut unsatisfied: BTreeMap<String, String> = BTreeMap::new();

        match self.spec.action {
            PackageAction::Install => {
                let targets = partition(&self.spec.names, &self.spec.versions)
                    .map_err(ConvergeError::from)?;

                for (name, version) in &targets.pinned {
                    if installed.get(name) != Some(version) {
                        unsatisfied.insert(name.clone(), version.clone());
                    }
                }

                let missing: Vec<&String> = targets
                    .unpinned
                    .iter()
                    .filter(|name| !installed.contains_key(*name))
                    .collect();
                if !missing.is_empty() {
                    let available = self
                        .client
                        .available_packages()
                        .map_err(ConvergeError::from)?;
                    for name in missing {
                        let candidate = available
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| "latest".to_string());
                        unsatisfied.insert(name.clone(), candidate);
                    }
                }
            }
            PackageAction::Upgrade => {
                let available = self
                    .client
                    .available_packages()
                    .map_err(ConvergeError::from)?;
                for name in &self.spec.names {
                    let candidate = available.get(name);
                    match (installed.get(name), candidate) {
                        (Some(current), Some(candidate)) if current != candidate => {
                            unsatisfied.insert(name.clone(), candidate.clone());
                        }
                        (None, candidate) => {
                            let version = candidate
                                .cloned()
                                .unwrap_or_else(|| "latest".to_string());
                            unsatisfied.insert(name.clone(), version);
                        }
                        _ => {}
                    }
                }
            }
            // Removal only needs presence; nothing to diff.
            PackageAction::Remove | PackageAction::Purge => {}
        }

        let mut diff = AttributeDiff::new();
        for (name, version) in unsatisfied {
            diff.push(name, version);
        }

        Ok(if any_installed {
            Observation::present(diff)
        } else {
            Observation {
                presence: Presence::Absent,
                diff,
            }
        })
    }

    fn create(&self) -> Result<()> {
        self.converge_targets(None).map_err(ConvergeError::from)
    }

    fn modify(&self, diff: &AttributeDiff) -> Result<()> {
        let needy: HashSet<String> = diff
            .deltas()
            .iter()
            .map(|delta| delta.field.clone())
            .collect();
        self.converge_targets(Some(&needy))
            .map_err(ConvergeError::from)
    }

    fn remove(&self) -> Result<()> {
        self.converge_targets(None).map_err(ConvergeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CHOCOLATEY_INSTALL_QUERY;
    use crate::powershell;
    use convergence::{converge, ConvergeAction, ErrorKind};
    use shellkit::{
        ArchContext, Architecture, CommandRunner, ExecutionResult, HostArchitecture,
        RecordingRunner, VirtualRedirection,
    };
    use std::sync::Arc;

    const EXE: &str = "C:/ProgramData/chocolatey/bin/choco.exe";

    fn base_runner() -> RecordingRunner {
        RecordingRunner::new().respond(
            &powershell::build_command(CHOCOLATEY_INSTALL_QUERY),
            ExecutionResult::succeeded("C:/ProgramData/chocolatey\n"),
        )
    }

    fn with_lists(installed: &str, available: &str) -> Arc<RecordingRunner> {
        Arc::new(
            base_runner()
                .respond(
                    &format!("{EXE} list -l -r"),
                    ExecutionResult::succeeded(installed),
                )
                .respond(&format!("{EXE} list -r"), ExecutionResult::succeeded(available)),
        )
    }

    fn provider(spec: PackageSpec, runner: &Arc<RecordingRunner>) -> PackageProvider {
        let arch = ArchContext::new(
            HostArchitecture::new(Architecture::X86_64, Architecture::X86_64),
            Arc::new(VirtualRedirection::new()),
        );
        let client = ChocoClient::new(Arc::clone(runner) as Arc<dyn CommandRunner>, arch);
        PackageProvider::new(spec, client)
    }

    fn install_commands(runner: &RecordingRunner) -> Vec<String> {
        runner
            .commands()
            .into_iter()
            .filter(|c| c.contains(" install ") || c.ends_with(" install"))
            .collect()
    }

    #[test]
    fn test_mixed_pins_issue_one_pinned_call_and_one_batch() {
        // names ["a", "b"], versions ["1.0", None], nothing installed.
        let runner = with_lists("", "b|2.0\n");
        let spec = PackageSpec::install(vec!["a".to_string(), "b".to_string()])
            .with_versions(vec![Some("1.0".to_string()), None]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert!(outcome.succeeded());
        assert_eq!(outcome.action, ConvergeAction::Create);
        assert_eq!(
            install_commands(&runner),
            vec![
                format!("{EXE} install -y -version '1.0' a"),
                format!("{EXE} install -y b"),
            ]
        );
    }

    #[test]
    fn test_satisfied_install_is_noop() {
        let runner = with_lists("a|1.0\nb|3.1\n", "");
        let spec = PackageSpec::install(vec!["a".to_string(), "b".to_string()])
            .with_versions(vec![Some("1.0".to_string()), None]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.action, ConvergeAction::NoOp);
        assert!(install_commands(&runner).is_empty());
    }

    #[test]
    fn test_pin_mismatch_modifies_only_the_needy_target() {
        let runner = with_lists("a|1.0\nb|3.1\n", "");
        let spec = PackageSpec::install(vec!["a".to_string(), "b".to_string()])
            .with_versions(vec![Some("2.0".to_string()), None]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.action, ConvergeAction::Modify);
        assert_eq!(
            install_commands(&runner),
            vec![format!("{EXE} install -y -version '2.0' a")]
        );
    }

    #[test]
    fn test_upgrade_with_pin_fails_with_zero_commands() {
        let runner = Arc::new(RecordingRunner::new());
        let spec = PackageSpec::upgrade(vec!["a".to_string(), "b".to_string()])
            .with_versions(vec![Some("1.0".to_string()), None]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert!(!outcome.succeeded());
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::Unsupported);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_upgrade_batches_outdated_names() {
        let runner = with_lists("b|1.0\nc|1.0\n", "b|2.0\nc|1.0\n");
        let spec = PackageSpec::upgrade(vec!["b".to_string(), "c".to_string()]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.action, ConvergeAction::Modify);
        let commands = runner.commands();
        assert_eq!(commands.last().unwrap(), &format!("{EXE} upgrade -y b"));
    }

    #[test]
    fn test_remove_uninstalls_all_names_in_one_call() {
        let runner = with_lists("a|1.0\n", "");
        let spec = PackageSpec::remove(vec!["a".to_string(), "b".to_string()]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.action, ConvergeAction::Remove);
        assert_eq!(
            runner.commands().last().unwrap(),
            &format!("{EXE} uninstall -y a b")
        );
    }

    #[test]
    fn test_remove_of_absent_packages_is_noop() {
        let runner = with_lists("", "");
        let spec = PackageSpec::remove(vec!["a".to_string()]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.action, ConvergeAction::NoOp);
        assert!(!runner.commands().iter().any(|c| c.contains("uninstall")));
    }

    #[test]
    fn test_purge_behaves_like_remove() {
        let runner = with_lists("a|1.0\n", "");
        let spec = PackageSpec::purge(vec!["a".to_string()]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.action, ConvergeAction::Remove);
        assert_eq!(
            runner.commands().last().unwrap(),
            &format!("{EXE} uninstall -y a")
        );
    }

    #[test]
    fn test_source_is_rejected_before_any_command() {
        let runner = Arc::new(RecordingRunner::new());
        let spec = PackageSpec::install(vec!["a".to_string()]).with_source("https://feed.local");
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert!(!outcome.succeeded());
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::Validation);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_length_mismatch_is_rejected_before_any_command() {
        let runner = Arc::new(RecordingRunner::new());
        let spec =
            PackageSpec::install(vec!["a".to_string(), "b".to_string()]).with_versions(vec![None]);
        let provider = provider(spec, &runner);

        let outcome = converge(&provider);

        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::InvalidArgument);
        assert!(runner.commands().is_empty());
    }
}
