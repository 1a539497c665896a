use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a bootstrap run.
///
/// Each variant is reported where it is detected; by the time one reaches
/// the top level the user has already seen the diagnostic, so the caller
/// only needs [`BootstrapError::exit_code`].
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid invocation")]
    Usage,

    #[error("could not determine the dub version: {reason}")]
    VersionUnresolved { reason: String },

    #[error("failed to write {}: {source}", path.display())]
    VersionWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no D compiler found (tried: {})", tried.join(", "))]
    NoCompiler { tried: Vec<String> },

    #[error("compiler exited with status {status}")]
    BuildFailed { status: i32 },

    #[error("built binary failed its version check (status {status})")]
    VerificationFailed { status: i32 },

    #[error("could not locate the dub project root: {message}")]
    Root { message: String },

    #[error("invalid bootstrap settings in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl BootstrapError {
    /// Process exit code for this failure. Every failure path exits with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
