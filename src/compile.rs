//! Assembling and running the single compiler invocation that builds dub.

use std::io::Write;

use crate::config::{Config, Paths};
use crate::error::BootstrapError;
use crate::process::{self, CommandSpec, Runner};

/// Full compiler command line, in this order: output path, include path,
/// `-version=` identifiers, user flags, then the `@` manifest reference.
pub fn command(
    compiler: &str,
    paths: &Paths,
    versions: &[String],
    dflags: &[String],
) -> CommandSpec {
    CommandSpec::new(compiler)
        .arg(format!("-of{}", paths.binary.display()))
        .arg(format!("-I{}", paths.source_dir.display()))
        .args(versions.iter().map(|v| format!("-version={v}")))
        .args(dflags.iter().cloned())
        .arg(format!("@{}", paths.manifest.display()))
        .current_dir(&paths.root)
}

/// Run the build once. On failure the command and its output are printed.
pub fn build(
    compiler: &str,
    config: &Config,
    runner: &dyn Runner,
    out: &mut dyn Write,
) -> Result<(), BootstrapError> {
    let spec = command(
        compiler,
        &config.paths,
        &config.settings.versions,
        config.dflags(),
    );

    report!(out, "Building dub using {compiler}, this may take a while...");
    tracing::info!(command = %spec, "building");

    let captured = process::run_or_report(runner, &spec);
    if captured.success() {
        return Ok(());
    }

    report!(out, "Building dub failed. The command was:");
    report!(out, "  {spec}");
    if !captured.output.is_empty() {
        report!(out, "Output:");
        report!(out, "{}", captured.output.trim_end());
    }
    Err(BootstrapError::BuildFailed {
        status: captured.status,
    })
}
