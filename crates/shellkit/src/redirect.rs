//! Architecture-scoped file-system redirection.
//!
//! WoW64 transparently redirects system paths for 32-bit processes on
//! 64-bit Windows. Reaching the native location requires disabling
//! redirection for the duration of a call and restoring the prior state
//! afterwards. The toggle is process-wide, so the whole disable/run/restore
//! bracket is a critical section: [`ArchContext::with_architecture`]
//! serializes it behind a process-wide mutex and restores on every exit
//! path.

use crate::arch::{Architecture, HostArchitecture};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Opaque cookie capturing the redirection state prior to a disable call.
#[derive(Debug)]
pub struct RedirectionToken(pub(crate) usize);

/// Toggle for the host's file-system redirection state.
///
/// Implementations own the actual mechanism: [`Wow64Redirection`] calls the
/// Win32 API, [`VirtualRedirection`] keeps an in-memory flag for tests and
/// hosts without WoW64.
pub trait RedirectionControl: Send + Sync {
    /// Disable redirection, returning a token capturing the prior state.
    fn disable(&self) -> Result<RedirectionToken>;

    /// Restore the state captured by `token`.
    fn restore(&self, token: RedirectionToken) -> Result<()>;
}

/// In-memory redirection flag.
///
/// Stands in for the Win32 toggle in tests and on hosts where WoW64 does
/// not exist; the flag starts enabled, mirroring a WoW64 process default.
#[derive(Debug)]
pub struct VirtualRedirection {
    enabled: AtomicBool,
}

impl VirtualRedirection {
    /// A flag in the enabled (redirecting) state.
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }

    /// Current state of the flag.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl Default for VirtualRedirection {
    fn default() -> Self {
        Self::new()
    }
}

impl RedirectionControl for VirtualRedirection {
    fn disable(&self) -> Result<RedirectionToken> {
        let prior = self.enabled.swap(false, Ordering::SeqCst);
        Ok(RedirectionToken(usize::from(prior)))
    }

    fn restore(&self, token: RedirectionToken) -> Result<()> {
        self.enabled.store(token.0 != 0, Ordering::SeqCst);
        Ok(())
    }
}

/// Real WoW64 redirection toggle backed by the Win32 API.
#[cfg(windows)]
#[derive(Debug)]
pub struct Wow64Redirection;

#[cfg(windows)]
#[allow(unsafe_code)]
impl RedirectionControl for Wow64Redirection {
    fn disable(&self) -> Result<RedirectionToken> {
        use windows_sys::Win32::Storage::FileSystem::Wow64DisableWow64FsRedirection;

        let mut old: *mut core::ffi::c_void = std::ptr::null_mut();
        // SAFETY: `old` outlives the call and receives the prior state.
        let ok = unsafe { Wow64DisableWow64FsRedirection(&mut old) };
        if ok == 0 {
            return Err(Error::RedirectionDisable {
                message: std::io::Error::last_os_error().to_string(),
            });
        }
        Ok(RedirectionToken(old as usize))
    }

    fn restore(&self, token: RedirectionToken) -> Result<()> {
        use windows_sys::Win32::Storage::FileSystem::Wow64RevertWow64FsRedirection;

        // SAFETY: the token holds the pointer the disable call produced.
        let ok = unsafe { Wow64RevertWow64FsRedirection(token.0 as *mut core::ffi::c_void) };
        if ok == 0 {
            return Err(Error::RedirectionRestore {
                message: std::io::Error::last_os_error().to_string(),
                body_error: None,
            });
        }
        Ok(())
    }
}

/// Serializes guarded scopes; overlapping disable/restore pairs from
/// different threads would leave the host in an inconsistent state.
static REDIRECTION_SCOPE: Mutex<()> = Mutex::new(());

/// Architecture context for command execution.
///
/// Resolves a requested architecture against the host and brackets the
/// body with a redirection toggle when the effective view cannot be
/// reached through the process default.
pub struct ArchContext {
    host: HostArchitecture,
    control: Arc<dyn RedirectionControl>,
}

impl ArchContext {
    /// Build a context over an explicit host description and toggle.
    pub fn new(host: HostArchitecture, control: Arc<dyn RedirectionControl>) -> Self {
        Self { host, control }
    }

    /// Context for the detected host.
    pub fn detect(control: Arc<dyn RedirectionControl>) -> Self {
        Self::new(HostArchitecture::detect(), control)
    }

    /// The host this context resolves against.
    pub fn host(&self) -> HostArchitecture {
        self.host
    }

    /// The architecture a call will effectively run under: the explicit
    /// request if present, else the process default.
    pub fn effective(&self, requested: Option<Architecture>) -> Architecture {
        requested.unwrap_or_else(|| self.host.process())
    }

    /// Whether reaching `effective` requires disabling redirection: only
    /// an emulated process asked for a view other than its own default.
    fn override_required(&self, effective: Architecture) -> bool {
        self.host.is_emulated() && effective != self.host.process()
    }

    /// Run `body` under the requested architecture view.
    ///
    /// When no toggle is needed the body runs directly. Otherwise the
    /// prior redirection state is captured, the body runs, and the state
    /// is restored before this method returns - whether the body
    /// succeeded or failed. A restore failure surfaces as
    /// [`Error::RedirectionRestore`], preserving the body's error if both
    /// failed.
    pub fn with_architecture<T>(
        &self,
        requested: Option<Architecture>,
        body: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let effective = self.effective(requested);
        if !self.override_required(effective) {
            return body();
        }

        log::debug!(
            "disabling file-system redirection for {} call on {} process",
            effective,
            self.host.process()
        );

        let _scope = REDIRECTION_SCOPE
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let token = self.control.disable()?;
        let outcome = body();

        match self.control.restore(token) {
            Ok(()) => outcome,
            Err(restore_err) => {
                let message = match restore_err {
                    Error::RedirectionRestore { message, .. } => message,
                    other => other.to_string(),
                };
                Err(Error::RedirectionRestore {
                    message,
                    body_error: outcome.err().map(Box::new),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emulated_context(control: Arc<dyn RedirectionControl>) -> ArchContext {
        ArchContext::new(
            HostArchitecture::new(Architecture::X86_64, Architecture::X86),
            control,
        )
    }

    /// Control whose restore always fails.
    struct BrokenRestore;

    impl RedirectionControl for BrokenRestore {
        fn disable(&self) -> Result<RedirectionToken> {
            Ok(RedirectionToken(1))
        }

        fn restore(&self, _token: RedirectionToken) -> Result<()> {
            Err(Error::RedirectionRestore {
                message: "revert rejected".to_string(),
                body_error: None,
            })
        }
    }

    #[test]
    fn test_native_view_runs_without_toggle() {
        let control = Arc::new(VirtualRedirection::new());
        let ctx = ArchContext::new(
            HostArchitecture::new(Architecture::X86_64, Architecture::X86_64),
            Arc::clone(&control) as Arc<dyn RedirectionControl>,
        );

        let ran = ctx
            .with_architecture(Some(Architecture::X86_64), || Ok(control.is_enabled()))
            .unwrap();
        // Body observed redirection untouched.
        assert!(ran);
        assert!(control.is_enabled());
    }

    #[test]
    fn test_emulated_default_view_runs_without_toggle() {
        let control = Arc::new(VirtualRedirection::new());
        let ctx = emulated_context(Arc::clone(&control) as Arc<dyn RedirectionControl>);

        ctx.with_architecture(None, || Ok(())).unwrap();
        assert!(control.is_enabled());
    }

    #[test]
    fn test_native_request_from_emulated_process_toggles_and_restores() {
        let control = Arc::new(VirtualRedirection::new());
        let ctx = emulated_context(Arc::clone(&control) as Arc<dyn RedirectionControl>);

        let seen = ctx
            .with_architecture(Some(Architecture::X86_64), || Ok(control.is_enabled()))
            .unwrap();
        assert!(!seen, "body should run with redirection disabled");
        assert!(control.is_enabled(), "prior state restored after the call");
    }

    #[test]
    fn test_restores_after_body_failure() {
        let control = Arc::new(VirtualRedirection::new());
        let ctx = emulated_context(Arc::clone(&control) as Arc<dyn RedirectionControl>);

        let err = ctx
            .with_architecture(Some(Architecture::X86_64), || {
                Err::<(), _>(Error::CommandFailed {
                    command: "choco install -y git".to_string(),
                    status: 1,
                    stderr: String::new(),
                })
            })
            .unwrap_err();

        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(control.is_enabled(), "prior state restored before propagation");
    }

    #[test]
    fn test_restore_failure_surfaces_distinctly() {
        let ctx = emulated_context(Arc::new(BrokenRestore));

        let err = ctx
            .with_architecture(Some(Architecture::X86_64), || Ok(()))
            .unwrap_err();

        match err {
            Error::RedirectionRestore { body_error, .. } => assert!(body_error.is_none()),
            _ => panic!("expected RedirectionRestore"),
        }
    }

    #[test]
    fn test_restore_failure_preserves_body_error() {
        let ctx = emulated_context(Arc::new(BrokenRestore));

        let err = ctx
            .with_architecture(Some(Architecture::X86_64), || {
                Err::<(), _>(Error::CommandFailed {
                    command: "choco upgrade -y git".to_string(),
                    status: 2,
                    stderr: String::new(),
                })
            })
            .unwrap_err();

        match err {
            Error::RedirectionRestore { body_error, .. } => {
                assert!(matches!(
                    body_error.as_deref(),
                    Some(Error::CommandFailed { status: 2, .. })
                ));
            }
            _ => panic!("expected RedirectionRestore"),
        }
    }

    #[test]
    fn test_guarded_scopes_serialize_across_threads() {
        let control = Arc::new(VirtualRedirection::new());
        let ctx = Arc::new(emulated_context(
            Arc::clone(&control) as Arc<dyn RedirectionControl>
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                std::thread::spawn(move || {
                    ctx.with_architecture(Some(Architecture::X86_64), || Ok(()))
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert!(control.is_enabled());
    }
}
