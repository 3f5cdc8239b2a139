//! Chocolatey CLI backend.
//!
//! Every invocation runs through the architecture context: a WoW64
//! process asked for the native view gets file-system redirection
//! disabled for exactly the duration of the call. The choco executable
//! location and the installed/candidate package lists are memoized per
//! client, and a client lives for one convergence attempt.

use crate::error::{Error, Result};
use crate::partition::{ensure_unpinned, Partitioned};
use crate::powershell;
use shellkit::{ArchContext, Architecture, CommandRunner, CommandSpec, ExecutionResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// PowerShell expression yielding the machine-scoped Chocolatey root.
pub(crate) const CHOCOLATEY_INSTALL_QUERY: &str =
    "[System.Environment]::GetEnvironmentVariable('ChocolateyInstall', 'MACHINE')";

/// Client for the choco command-line tool.
pub struct ChocoClient {
    runner: Arc<dyn CommandRunner>,
    arch: ArchContext,
    architecture: Option<Architecture>,
    choco_exe: Mutex<Option<String>>,
    installed: Mutex<Option<HashMap<String, String>>>,
    available: Mutex<Option<HashMap<String, String>>>,
}

impl ChocoClient {
    /// Build a client dispatching through `runner` under `arch`.
    pub fn new(runner: Arc<dyn CommandRunner>, arch: ArchContext) -> Self {
        Self {
            runner,
            arch,
            architecture: None,
            choco_exe: Mutex::new(None),
            installed: Mutex::new(None),
            available: Mutex::new(None),
        }
    }

    /// Execute every call under a specific architecture view.
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    /// Run one command line under the client's architecture view,
    /// raising on nonzero exit.
    fn dispatch(&self, command: String) -> Result<ExecutionResult> {
        let result = self.arch.with_architecture(self.architecture, || {
            self.runner.run(&CommandSpec::checked(&command))
        })?;
        Ok(result)
    }

    fn powershell(&self, script: &str) -> Result<ExecutionResult> {
        self.dispatch(powershell::build_command(script))
    }

    /// Absolute path of choco.exe, resolved from the machine-scoped
    /// `ChocolateyInstall` environment variable. Memoized.
    pub fn choco_exe(&self) -> Result<String> {
        cached(&self.choco_exe, || {
            let result = self.powershell(CHOCOLATEY_INSTALL_QUERY)?;
            let root = result.stdout_str().trim().to_string();
            if root.is_empty() {
                return Err(Error::ChocoNotFound);
            }
            log::debug!("chocolatey install root: {root}");
            Ok(format!("{root}/bin/choco.exe"))
        })
    }

    /// Installed packages as a name-to-version map. Memoized.
    pub fn installed_packages(&self) -> Result<HashMap<String, String>> {
        cached(&self.installed, || {
            let exe = self.choco_exe()?;
            let result = self.dispatch(format!("{exe} list -l -r"))?;
            Ok(parse_list_output(&result.stdout_str()))
        })
    }

    /// Candidate versions from the remote feed, name-to-version. Memoized.
    pub fn available_packages(&self) -> Result<HashMap<String, String>> {
        cached(&self.available, || {
            let exe = self.choco_exe()?;
            let result = self.dispatch(format!("{exe} list -r"))?;
            Ok(parse_list_output(&result.stdout_str()))
        })
    }

    /// Install a partitioned target set.
    ///
    /// choco cannot batch-install multiple pinned versions, so each
    /// pinned pair gets its own invocation; the unpinned batch goes out
    /// as one space-joined call.
    pub fn install(&self, targets: &Partitioned, options: Option<&str>) -> Result<()> {
        let exe = self.choco_exe()?;
        let opts = opts_fragment(options);

        for (name, version) in &targets.pinned {
            self.dispatch(format!("{exe} install -y -version '{version}'{opts} {name}"))?;
        }

        if !targets.unpinned.is_empty() {
            let names = targets.unpinned.join(" ");
            self.dispatch(format!("{exe} install -y{opts} {names}"))?;
        }
        Ok(())
    }

    /// Upgrade `names` to their latest candidates in one batched call.
    ///
    /// Any version pin is rejected before a command is built; install is
    /// the operation that honors pins.
    pub fn upgrade(
        &self,
        names: &[String],
        versions: &[Option<String>],
        options: Option<&str>,
    ) -> Result<()> {
        ensure_unpinned(versions)?;

        let exe = self.choco_exe()?;
        let opts = opts_fragment(options);
        let names = names.join(" ");
        self.dispatch(format!("{exe} upgrade -y{opts} {names}"))?;
        Ok(())
    }

    /// Uninstall `names` in one batched call.
    pub fn uninstall(&self, names: &[String], options: Option<&str>) -> Result<()> {
        let exe = self.choco_exe()?;
        let opts = opts_fragment(options);
        let names = names.join(" ");
        self.dispatch(format!("{exe} uninstall -y{opts} {names}"))?;
        Ok(())
    }
}

/// Return the cached value in `slot`, loading it on first use.
fn cached<T: Clone>(slot: &Mutex<Option<T>>, load: impl FnOnce() -> Result<T>) -> Result<T> {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(value) = guard.as_ref() {
        return Ok(value.clone());
    }
    let value = load()?;
    *guard = Some(value.clone());
    Ok(value)
}

fn opts_fragment(options: Option<&str>) -> String {
    options.map(|o| format!(" {o}")).unwrap_or_default()
}

/// Parse `choco list -r` output: one `name|version` pair per line.
fn parse_list_output(output: &str) -> HashMap<String, String> {
    let mut packages = HashMap::new();
    for line in output.lines() {
        if let Some((name, version)) = line.trim().split_once('|') {
            packages.insert(name.to_string(), version.to_string());
        }
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellkit::{HostArchitecture, RecordingRunner, VirtualRedirection};

    const EXE: &str = "C:/ProgramData/chocolatey/bin/choco.exe";

    fn exe_query() -> String {
        powershell::build_command(CHOCOLATEY_INSTALL_QUERY)
    }

    fn native_arch() -> ArchContext {
        ArchContext::new(
            HostArchitecture::new(Architecture::X86_64, Architecture::X86_64),
            Arc::new(VirtualRedirection::new()),
        )
    }

    fn client(runner: &Arc<RecordingRunner>) -> ChocoClient {
        ChocoClient::new(
            Arc::clone(runner) as Arc<dyn CommandRunner>,
            native_arch(),
        )
    }

    fn runner_with_exe() -> Arc<RecordingRunner> {
        Arc::new(RecordingRunner::new().respond(
            &exe_query(),
            ExecutionResult::succeeded("C:/ProgramData/chocolatey\r\n"),
        ))
    }

    #[test]
    fn test_choco_exe_resolved_from_machine_env() {
        let runner = runner_with_exe();
        let client = client(&runner);

        assert_eq!(client.choco_exe().unwrap(), EXE);
        // Second call is served from the memo.
        client.choco_exe().unwrap();
        assert_eq!(runner.commands().len(), 1);
    }

    #[test]
    fn test_missing_install_root_is_an_error() {
        let runner =
            Arc::new(RecordingRunner::new().respond(&exe_query(), ExecutionResult::succeeded("\n")));
        let client = client(&runner);

        assert!(matches!(client.choco_exe(), Err(Error::ChocoNotFound)));
    }

    #[test]
    fn test_parse_list_output_pairs() {
        let packages = parse_list_output("git|2.40.0\r\nripgrep|14.1.0\r\n");
        assert_eq!(packages.get("git").map(String::as_str), Some("2.40.0"));
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn test_parse_list_output_skips_chatter() {
        let packages = parse_list_output("Chocolatey v2.2.2\ngit|2.40.0\n");
        assert_eq!(packages.len(), 1);
    }

    #[test]
    fn test_installed_packages_cached_per_client() {
        let runner = Arc::new(
            RecordingRunner::new()
                .respond(
                    &exe_query(),
                    ExecutionResult::succeeded("C:/ProgramData/chocolatey"),
                )
                .respond(
                    &format!("{EXE} list -l -r"),
                    ExecutionResult::succeeded("git|2.40.0\n"),
                ),
        );
        let client = client(&runner);

        client.installed_packages().unwrap();
        client.installed_packages().unwrap();

        let lists = runner
            .commands()
            .iter()
            .filter(|c| c.ends_with("list -l -r"))
            .count();
        assert_eq!(lists, 1);
    }

    #[test]
    fn test_install_issues_one_call_per_pin_and_one_batch() {
        let runner = runner_with_exe();
        let client = client(&runner);

        let targets = Partitioned {
            pinned: vec![("a".to_string(), "1.0".to_string())],
            unpinned: vec!["b".to_string(), "c".to_string()],
        };
        client.install(&targets, None).unwrap();

        let commands = runner.commands();
        assert_eq!(commands[1], format!("{EXE} install -y -version '1.0' a"));
        assert_eq!(commands[2], format!("{EXE} install -y b c"));
    }

    #[test]
    fn test_install_threads_options_through() {
        let runner = runner_with_exe();
        let client = client(&runner);

        let targets = Partitioned {
            pinned: Vec::new(),
            unpinned: vec!["git".to_string()],
        };
        client.install(&targets, Some("--forcex86")).unwrap();

        assert_eq!(
            runner.commands()[1],
            format!("{EXE} install -y --forcex86 git")
        );
    }

    #[test]
    fn test_upgrade_batches_names() {
        let runner = runner_with_exe();
        let client = client(&runner);

        client
            .upgrade(
                &["b".to_string(), "c".to_string()],
                &[None, None],
                None,
            )
            .unwrap();

        assert_eq!(runner.commands()[1], format!("{EXE} upgrade -y b c"));
    }

    #[test]
    fn test_upgrade_rejects_pins_before_any_command() {
        let runner = Arc::new(RecordingRunner::new());
        let client = client(&runner);

        let err = client
            .upgrade(
                &["a".to_string(), "b".to_string()],
                &[Some("1.0".to_string()), None],
                None,
            )
            .unwrap_err();

        assert!(matches!(err, Error::PinnedUpgrade));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_uninstall_batches_names() {
        let runner = runner_with_exe();
        let client = client(&runner);

        client
            .uninstall(&["a".to_string(), "b".to_string()], None)
            .unwrap();

        assert_eq!(runner.commands()[1], format!("{EXE} uninstall -y a b"));
    }
}
