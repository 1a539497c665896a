//! Bootstrap build for the dub package manager.
//!
//! A run goes through these phases, stopping at the first failure:
//! parse arguments, resolve the version file, detect a D compiler, build
//! `bin/dub` from `build-files.txt`, then smoke test the result.

#[macro_use]
mod output;

pub mod cli;
pub mod compile;
pub mod compiler;
pub mod config;
pub mod error;
pub mod process;
pub mod verify;
pub mod version;

use std::io::Write;

use crate::cli::Invocation;
use crate::config::Config;
use crate::error::BootstrapError;
use crate::process::Runner;
use crate::verify::Platform;

/// Entry point used by `main`.
///
/// Usage is answered before `load` runs, so a broken root or settings file
/// cannot hide it; the usage text falls back to default settings then. A
/// configuration failure on the build path is reported to `out`.
pub fn bootstrap<L>(
    invocation: &Invocation,
    program: &str,
    load: L,
    runner: &dyn Runner,
    out: &mut dyn Write,
) -> Result<(), BootstrapError>
where
    L: FnOnce() -> Result<Config, BootstrapError>,
{
    if *invocation == Invocation::Usage {
        let settings = load().map(|c| c.settings).unwrap_or_default();
        return print_usage(program, &settings, out);
    }

    let config = match load() {
        Ok(config) => config,
        Err(e) => {
            report!(out, "Cannot start the bootstrap: {e}");
            return Err(e);
        }
    };
    tracing::debug!(root = %config.paths.root.display(), "configuration loaded");
    run(invocation, program, &config, runner, out)
}

fn print_usage(
    program: &str,
    settings: &config::Settings,
    out: &mut dyn Write,
) -> Result<(), BootstrapError> {
    report!(out, "{}", cli::usage(program, settings).trim_end());
    Err(BootstrapError::Usage)
}

/// Run the whole bootstrap with a loaded configuration. All user-facing
/// output goes to `out`.
pub fn run(
    invocation: &Invocation,
    program: &str,
    config: &Config,
    runner: &dyn Runner,
    out: &mut dyn Write,
) -> Result<(), BootstrapError> {
    let explicit = match invocation {
        Invocation::Usage => return print_usage(program, &config.settings, out),
        Invocation::Build { version } => version
            .as_deref()
            .unwrap_or(&config.overrides.version),
    };

    version::resolve(
        explicit,
        &config.paths.version_file,
        &config.paths.root,
        runner,
        out,
    )?;

    let compiler = compiler::detect(
        config.overrides.compiler.as_deref(),
        &config.settings.compilers,
        runner,
        out,
    )
    .ok_or_else(|| BootstrapError::NoCompiler {
        tried: config.settings.compilers.clone(),
    })?;
    report!(out, "Using compiler: {compiler}");

    compile::build(&compiler, config, runner, out)?;

    verify::verify(&config.paths.binary, Platform::current(), runner, out)
}
