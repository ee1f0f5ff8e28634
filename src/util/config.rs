//! Configuration file support for flintext.
//!
//! Two configuration file locations are supported:
//! - Global: `~/.flintext/config.toml` - User-wide defaults
//! - Project: `.flintext/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, field by field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Default distribution directory, relative to the project root.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// flintext configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain overrides
    pub toolchain: ToolchainSettings,

    /// Build settings
    pub build: BuildSettings,

    /// Install settings
    pub install: InstallSettings,
}

/// Tool locations and extra flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Path to the Cython translator
    pub cython: Option<PathBuf>,

    /// Host interpreter used to probe include directories and module suffix
    pub python: Option<PathBuf>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Build directory (relative paths are resolved against the project root)
    pub build_dir: Option<PathBuf>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallSettings {
    /// Directory modules are installed into
    pub root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist
    /// or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let tc = other.toolchain;
        if tc.cc.is_some() {
            self.toolchain.cc = tc.cc;
        }
        if tc.cython.is_some() {
            self.toolchain.cython = tc.cython;
        }
        if tc.python.is_some() {
            self.toolchain.python = tc.python;
        }
        if !tc.cflags.is_empty() {
            self.toolchain.cflags = tc.cflags;
        }
        if !tc.ldflags.is_empty() {
            self.toolchain.ldflags = tc.ldflags;
        }
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.install.root.is_some() {
            self.install.root = other.install.root;
        }
    }

    /// Resolve the build directory for a project rooted at `root`.
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        let dir = self
            .build
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        crate::util::fs::resolve_against(root, &dir)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.flintext/config.toml)
/// 2. Global config (~/.flintext/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global flintext config directory (~/.flintext).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".flintext"))
}

/// Get the global config path (~/.flintext/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.flintext/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".flintext").join("config.toml")
}
