//! Subprocess execution.
//!
//! Every external program the bootstrap touches (compilers, `git`, the
//! freshly built binary) goes through a [`Runner`], so the pipeline can be
//! driven by a scripted fake in tests. Commands are passed as token lists and
//! never interpreted by a shell.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// A program plus its arguments, and optionally the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status and combined output of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Exit code, or -1 when the process was terminated by a signal.
    pub status: i32,
    /// Standard output followed by standard error.
    pub output: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

pub trait Runner {
    /// Run the command to completion. An `Err` means it could not be launched.
    fn run(&self, spec: &CommandSpec) -> io::Result<Captured>;
}

/// Runs commands with [`std::process::Command`], blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<Captured> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(ref dir) = spec.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %spec, "running");
        let output = cmd.output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let status = output.status.code().unwrap_or(-1);
        tracing::debug!(program = %spec.program, status, "finished");

        Ok(Captured {
            status,
            output: combined,
        })
    }
}

/// Launch failures look like a failed run to callers that only report output.
pub fn run_or_report(runner: &dyn Runner, spec: &CommandSpec) -> Captured {
    runner.run(spec).unwrap_or_else(|e| Captured {
        status: -1,
        output: format!("failed to run {}: {e}", spec.program),
    })
}
