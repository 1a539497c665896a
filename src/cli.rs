//! Invocation handling: `dub-bootstrap [<version>]`.

use std::ffi::OsString;

use crate::config::Settings;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit non-zero.
    Usage,
    /// Run the bootstrap, with an explicit version if one was given.
    Build { version: Option<String> },
}

impl Invocation {
    /// Classify raw arguments (program name excluded), exactly as the OS
    /// passed them: a literal `--` counts like any other argument.
    ///
    /// More than one argument, a single help-looking one, or a version that
    /// is not valid UTF-8 means usage.
    pub fn classify(args: &[OsString]) -> Self {
        match args {
            [] => Invocation::Build { version: None },
            [arg] => match arg.to_str() {
                Some(s) if !is_help_token(s) => Invocation::Build {
                    version: Some(s.to_string()),
                },
                _ => Invocation::Usage,
            },
            _ => Invocation::Usage,
        }
    }
}

/// Case-sensitive: anything containing "help" or "?", or exactly "-h".
pub fn is_help_token(arg: &str) -> bool {
    arg.contains("help") || arg.contains('?') || arg == "-h"
}

pub fn usage(program: &str, settings: &Settings) -> String {
    format!(
        "Usage: {program} [<version>]\n\
         \n\
         Builds dub using {compilers}.\n\
         The compiler can also be chosen with the DMD environment variable.\n\
         DFLAGS can be used to pass build flags to the compiler (default: {dflags}).\n\
         \n\
         The version of dub is written to source/dub/version_.d and determined by\n\
         (in that order):\n\
         \x20 - the <version> argument\n\
         \x20 - the GITVER environment variable\n\
         \x20 - an existing source/dub/version_.d, which is left untouched\n\
         \x20 - running `git describe`\n\
         \n\
         dub-bootstrap {}\n",
        env!("CARGO_PKG_VERSION"),
        compilers = or_list(&settings.compilers),
        dflags = settings.default_dflags.join(" "),
    )
}

fn or_list(items: &[String]) -> String {
    match items {
        [] => "the compiler named by DMD".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}
