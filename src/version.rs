//! Resolving the dub version and generating `source/dub/version_.d`.
//!
//! Precedence: explicit argument, then `GITVER`, then an existing version
//! file (kept as is), then `git describe` run from the project root.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::BootstrapError;
use crate::process::{self, CommandSpec, Runner};

/// How the version file ended up in its final state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOutcome {
    /// Written from an explicit argument or `GITVER`.
    Explicit(String),
    /// An existing file was left untouched.
    Existing,
    /// Written from `git describe` output.
    Described(String),
}

/// Render the D module that declares `dubVersion`. The version is inserted verbatim.
pub fn render(version: &str) -> String {
    format!(
        "/**\n\
         \tDUB version file.\n\
         \n\
         \tThis file is generated by the bootstrap build. Do not edit it manually.\n\
         */\n\
         module dub.version_;\n\
         \n\
         enum dubVersion = \"{version}\";\n"
    )
}

/// Write the version file, creating its directory if needed.
///
/// I/O errors are reported to `out` and returned, never panicked on.
pub fn write_file(path: &Path, version: &str, out: &mut dyn Write) -> Result<(), BootstrapError> {
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, render(version)));

    match result {
        Ok(()) => {
            report!(out, "Version file written: {}", path.display());
            Ok(())
        }
        Err(source) => {
            report!(
                out,
                "Failed to write version file {}: {source}",
                path.display()
            );
            Err(BootstrapError::VersionWrite {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// The `git describe` invocation, run from the project root.
pub fn describe_command(root: &Path) -> CommandSpec {
    CommandSpec::new("git").arg("describe").current_dir(root)
}

/// Resolve the version and make sure the version file reflects it.
///
/// `explicit` is the positional argument if given, else `GITVER` (possibly empty).
pub fn resolve(
    explicit: &str,
    version_file: &Path,
    root: &Path,
    runner: &dyn Runner,
    out: &mut dyn Write,
) -> Result<VersionOutcome, BootstrapError> {
    if !explicit.is_empty() {
        report!(out, "Writing version file for {explicit}");
        write_file(version_file, explicit, out)?;
        return Ok(VersionOutcome::Explicit(explicit.to_string()));
    }

    if version_file.exists() {
        tracing::info!(path = %version_file.display(), "keeping existing version file");
        report!(
            out,
            "Using existing version file ({}); pass a version or set GITVER to regenerate it.",
            version_file.display()
        );
        return Ok(VersionOutcome::Existing);
    }

    let spec = describe_command(root);
    let described = process::run_or_report(runner, &spec);
    if !described.success() {
        report!(
            out,
            "Failed to determine the dub version: `{spec}` exited with status {}.",
            described.status
        );
        if !described.output.trim().is_empty() {
            report!(out, "{}", described.output.trim_end());
        }
        report!(
            out,
            "Either pass the version as an argument, set the GITVER environment variable, \
             or run from a git checkout of dub that has its release tags."
        );
        return Err(BootstrapError::VersionUnresolved {
            reason: format!("git describe exited with status {}", described.status),
        });
    }

    let version = described.output.trim_end().to_string();
    tracing::info!(%version, "version from git describe");
    write_file(version_file, &version, out)?;
    Ok(VersionOutcome::Described(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::ScriptedRunner;

    fn version_path(root: &Path) -> std::path::PathBuf {
        root.join("source").join("dub").join("version_.d")
    }

    #[test]
    fn test_render_declares_constant() {
        let text = render("v1.2.3");
        assert!(text.starts_with("/**"));
        assert!(text.contains("module dub.version_;"));
        assert!(text.ends_with("enum dubVersion = \"v1.2.3\";\n"));
    }

    #[test]
    fn test_explicit_version_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = version_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale contents").unwrap();

        let runner = ScriptedRunner::new();
        let mut out = Vec::new();
        let outcome = resolve("v9.9.9", &path, dir.path(), &runner, &mut out).unwrap();

        assert_eq!(outcome, VersionOutcome::Explicit("v9.9.9".into()));
        assert_eq!(fs::read_to_string(&path).unwrap(), render("v9.9.9"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_explicit_version_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = version_path(dir.path());
        let mut out = Vec::new();
        resolve("1.0", &path, dir.path(), &ScriptedRunner::new(), &mut out).unwrap();
        assert!(path.is_file());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Version file written"));
    }

    #[test]
    fn test_existing_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = version_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let original = b"module dub.version_;\nenum dubVersion = \"hand-edited\";\r\n";
        fs::write(&path, original).unwrap();

        let runner = ScriptedRunner::new().respond("git", 0, "v0.0.1\n");
        let mut out = Vec::new();
        let outcome = resolve("", &path, dir.path(), &runner, &mut out).unwrap();

        assert_eq!(outcome, VersionOutcome::Existing);
        assert_eq!(fs::read(&path).unwrap(), original);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_describe_output_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = version_path(dir.path());
        let runner = ScriptedRunner::new().respond("git", 0, "1.2.3\n");
        let mut out = Vec::new();

        let outcome = resolve("", &path, dir.path(), &runner, &mut out).unwrap();

        assert_eq!(outcome, VersionOutcome::Described("1.2.3".into()));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("enum dubVersion = \"1.2.3\";"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["describe"]);
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_describe_failure_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = version_path(dir.path());
        let runner = ScriptedRunner::new().respond("git", 128, "fatal: No names found\n");
        let mut out = Vec::new();

        let err = resolve("", &path, dir.path(), &runner, &mut out).unwrap_err();

        assert!(matches!(err, BootstrapError::VersionUnresolved { .. }));
        assert!(!path.exists());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("fatal: No names found"));
        assert!(printed.contains("GITVER"));
    }

    #[test]
    fn test_missing_git_is_a_resolution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = version_path(dir.path());
        let mut out = Vec::new();
        let err = resolve("", &path, dir.path(), &ScriptedRunner::new(), &mut out).unwrap_err();
        assert!(matches!(err, BootstrapError::VersionUnresolved { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the `source` directory should be.
        fs::write(dir.path().join("source"), "").unwrap();
        let path = version_path(dir.path());
        let mut out = Vec::new();

        let err = write_file(&path, "v1", &mut out).unwrap_err();

        assert!(matches!(err, BootstrapError::VersionWrite { .. }));
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Failed to write version file"));
    }
}
