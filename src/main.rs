use std::env;
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use dub_bootstrap::cli::Invocation;
use dub_bootstrap::config;
use dub_bootstrap::process::SystemRunner;

fn main() -> ExitCode {
    // Diagnostics go to stderr; the build report owns stdout
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    // Raw, unparsed: `--` and non-UTF-8 arguments must reach the classifier intact
    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let invocation = Invocation::classify(&args);
    tracing::debug!(?invocation, "starting");

    let mut stdout = io::stdout().lock();
    match dub_bootstrap::bootstrap(
        &invocation,
        "dub-bootstrap",
        config::load,
        &SystemRunner,
        &mut stdout,
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "bootstrap failed");
            ExitCode::from(e.exit_code())
        }
    }
}
