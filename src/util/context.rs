//! Global context for flintext operations.
//!
//! Provides centralized access to the working directory, manifest lookup and
//! configuration paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::manifest::MANIFEST_NAME;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Error locating the package manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{}` in `{}` or any parent directory", MANIFEST_NAME, dir.display())]
    NotFound { dir: PathBuf },

    #[error("manifest path `{}` does not exist", path.display())]
    MissingPath { path: PathBuf },
}

/// Global context containing the working directory.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext { cwd })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext { cwd }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Find the manifest, starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ManifestError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }

    /// Use an explicit manifest path if given, otherwise search upward.
    pub fn locate_manifest(&self, explicit: Option<&Path>) -> Result<PathBuf, ManifestError> {
        match explicit {
            Some(path) => {
                let path = crate::util::fs::resolve_against(&self.cwd, path);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ManifestError::MissingPath { path })
                }
            }
            None => self.find_manifest(),
        }
    }

    /// Load the merged global and project configuration for a project root.
    pub fn load_config(&self, project_root: &Path) -> Config {
        let global = global_config_path();
        load_config(global.as_deref(), &project_config_path(project_root))
    }
}
