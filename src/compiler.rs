//! D compiler detection.

use std::io::Write;

use crate::process::{CommandSpec, Runner};

/// Result of asking one candidate for its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Found,
    /// Ran but exited non-zero.
    Failed { status: i32 },
    /// Could not be launched at all, usually because it is not on `PATH`.
    Missing { reason: String },
}

pub fn probe(runner: &dyn Runner, candidate: &str) -> Probe {
    match runner.run(&CommandSpec::new(candidate).arg("--version")) {
        Ok(captured) if captured.success() => Probe::Found,
        Ok(captured) => Probe::Failed {
            status: captured.status,
        },
        Err(e) => Probe::Missing {
            reason: e.to_string(),
        },
    }
}

/// Pick the compiler to build with.
///
/// A non-empty `DMD` override is returned as is, without checking that it runs.
/// Otherwise candidates are probed in order and the first one that answers
/// `--version` successfully wins; later candidates are never started.
pub fn detect(
    override_name: Option<&str>,
    candidates: &[String],
    runner: &dyn Runner,
    out: &mut dyn Write,
) -> Option<String> {
    if let Some(name) = override_name.filter(|n| !n.is_empty()) {
        tracing::info!(compiler = name, "using compiler from DMD");
        return Some(name.to_string());
    }

    for candidate in candidates {
        match probe(runner, candidate) {
            Probe::Found => {
                tracing::info!(compiler = %candidate, "compiler found");
                return Some(candidate.clone());
            }
            Probe::Failed { status } => {
                tracing::warn!(compiler = %candidate, status, "compiler probe failed");
            }
            Probe::Missing { reason } => {
                tracing::warn!(compiler = %candidate, %reason, "compiler not available");
            }
        }
    }

    report!(
        out,
        "Failed to find a D compiler. Tried: {}",
        candidates.join(", ")
    );
    report!(
        out,
        "Install one of them or point the DMD environment variable at your compiler."
    );
    None
}
