//! The human-readable build report.
//!
//! Report lines are best effort: a closed stdout must not turn a successful
//! build into a failure, so write errors are logged and otherwise ignored.

use std::fmt;
use std::io::Write;

/// Write one line of the report to `out`.
macro_rules! report {
    ($out:expr) => {
        $crate::output::emit($out, format_args!(""))
    };
    ($out:expr, $($arg:tt)*) => {
        $crate::output::emit($out, format_args!($($arg)*))
    };
}

pub fn emit(out: &mut dyn Write, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{line}") {
        tracing::warn!(error = %e, "failed to write build report");
    }
}
