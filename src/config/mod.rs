use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::BootstrapError;

/// Name of the static build manifest, relative to the project root.
pub const MANIFEST_FILE: &str = "build-files.txt";

/// Optional project-local settings file, relative to the project root.
pub const SETTINGS_FILE: &str = "bootstrap.toml";

/// Environment variable that pins the project root instead of searching for it.
pub const ROOT_ENV: &str = "DUB_BOOTSTRAP_ROOT";

/// Filesystem locations the bootstrap reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    /// Generated `source/dub/version_.d`
    pub version_file: PathBuf,
    /// Include directory passed with `-I`
    pub source_dir: PathBuf,
    /// Response file listing every source to compile
    pub manifest: PathBuf,
    /// Output binary, `bin/dub` plus the platform executable suffix
    pub binary: PathBuf,
}

impl Paths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let source_dir = root.join("source");
        Paths {
            version_file: source_dir.join("dub").join("version_.d"),
            manifest: root.join(MANIFEST_FILE),
            binary: root
                .join("bin")
                .join(format!("dub{}", env::consts::EXE_SUFFIX)),
            source_dir,
            root,
        }
    }
}

/// Values read from `DMD`, `DFLAGS` and `GITVER` once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `DMD`; an empty value counts as unset.
    pub compiler: Option<String>,
    /// `DFLAGS` split on whitespace; `None` when the variable is unset.
    pub dflags: Option<Vec<String>>,
    /// `GITVER`, empty when unset.
    pub version: String,
}

impl Overrides {
    /// Build overrides from a variable lookup (usually `std::env::var`).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Overrides {
            compiler: lookup("DMD").filter(|v| !v.is_empty()),
            dflags: lookup("DFLAGS").map(|v| split_flags(&v)),
            version: lookup("GITVER").unwrap_or_default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }
}

pub fn split_flags(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Tunables from `bootstrap.toml`. Every field has a default, so the file is optional.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Compiler binaries probed in order when `DMD` is not set.
    #[serde(default = "default_compilers")]
    pub compilers: Vec<String>,

    /// Flags used when `DFLAGS` is not set.
    #[serde(default = "default_dflags")]
    pub default_dflags: Vec<String>,

    /// Version identifiers the dub sources require, passed as `-version=<id>`.
    #[serde(default = "default_versions")]
    pub versions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            compilers: default_compilers(),
            default_dflags: default_dflags(),
            versions: default_versions(),
        }
    }
}

fn default_compilers() -> Vec<String> {
    ["dmd", "ldmd2", "gdmd"].map(String::from).to_vec()
}

fn default_dflags() -> Vec<String> {
    ["-g", "-O", "-w"].map(String::from).to_vec()
}

fn default_versions() -> Vec<String> {
    ["DubUseCurl", "DubApplication"].map(String::from).to_vec()
}

/// Everything a run needs, resolved once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    pub overrides: Overrides,
    pub settings: Settings,
}

impl Config {
    /// Flags handed to the compiler after the fixed ones.
    pub fn dflags(&self) -> &[String] {
        self.overrides
            .dflags
            .as_deref()
            .unwrap_or(&self.settings.default_dflags)
    }
}

/// Load settings from `<root>/bootstrap.toml` (or return defaults if it doesn't exist)
pub fn load_settings(root: &Path) -> Result<Settings, BootstrapError> {
    let path = root.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| BootstrapError::Config {
        path: path.clone(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| BootstrapError::Config {
        path,
        message: e.to_string(),
    })
}

/// Find the project root.
///
/// `DUB_BOOTSTRAP_ROOT` wins when set. Otherwise walk up from the running
/// executable to the first directory holding `build-files.txt`, falling back
/// to the current directory.
pub fn discover_root(root_override: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = root_override.filter(|d| !d.is_empty()) {
        return fs::canonicalize(dir).with_context(|| format!("invalid {ROOT_ENV}: {dir}"));
    }

    let exe = env::current_exe().context("could not determine current executable")?;
    let exe = fs::canonicalize(&exe).unwrap_or(exe);
    if let Some(root) = find_manifest_dir(&exe) {
        return Ok(root.to_path_buf());
    }

    env::current_dir().context("could not determine current directory")
}

fn find_manifest_dir(start: &Path) -> Option<&Path> {
    start
        .ancestors()
        .skip(1)
        .find(|dir| dir.join(MANIFEST_FILE).is_file())
}

/// Resolve root, settings and environment overrides in one go.
pub fn load() -> Result<Config, BootstrapError> {
    let root = discover_root(env::var(ROOT_ENV).ok().as_deref()).map_err(|e| {
        BootstrapError::Root {
            message: format!("{e:#}"),
        }
    })?;
    let settings = load_settings(&root)?;
    Ok(Config {
        paths: Paths::from_root(root),
        overrides: Overrides::from_env(),
        settings,
    })
}
