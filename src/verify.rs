//! Smoke test of the freshly built binary.

use std::io::Write;
use std::path::Path;

use crate::error::BootstrapError;
use crate::process::{self, CommandSpec, Runner};

/// Platform family, for the post-install hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

pub fn install_hint(binary: &Path, platform: Platform) -> String {
    match platform {
        Platform::Posix => format!(
            "You may want to run 'sudo ln -s {} /usr/local/bin' now",
            binary.display()
        ),
        Platform::Windows => format!(
            "You may want to add the following entry to your PATH environment variable: {}",
            binary.parent().unwrap_or(binary).display()
        ),
    }
}

/// Run `<binary> --version` and report where the binary lives.
pub fn verify(
    binary: &Path,
    platform: Platform,
    runner: &dyn Runner,
    out: &mut dyn Write,
) -> Result<(), BootstrapError> {
    let spec = CommandSpec::new(binary.display().to_string()).arg("--version");
    let captured = process::run_or_report(runner, &spec);

    if !captured.success() {
        report!(
            out,
            "The dub binary at {} failed its version check (status {}):",
            binary.display(),
            captured.status
        );
        report!(out, "{}", captured.output.trim_end());
        return Err(BootstrapError::VerificationFailed {
            status: captured.status,
        });
    }

    tracing::info!(version = captured.output.trim(), "dub binary verified");
    report!(out, "DUB has been built as: {}", binary.display());
    report!(out);
    report!(out, "{}", install_hint(binary, platform));
    Ok(())
}
