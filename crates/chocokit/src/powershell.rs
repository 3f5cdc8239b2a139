//! PowerShell command construction.

/// Flags applied to every powershell.exe invocation.
const POWERSHELL_FLAGS: &[&str] = &[
    // Hides the copyright banner at startup
    "-NoLogo",
    // Never present an interactive prompt
    "-NonInteractive",
    // Skip the profile; it can change behavior and slows startup
    "-NoProfile",
    "-ExecutionPolicy RemoteSigned",
    // PowerShell hangs if stdin is redirected
    "-InputFormat None",
];

/// Render a full powershell.exe command line around `script`.
pub fn build_command(script: &str) -> String {
    format!(
        "powershell.exe {} -Command \"{}\"",
        POWERSHELL_FLAGS.join(" "),
        script
    )
}
