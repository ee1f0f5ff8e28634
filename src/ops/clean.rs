//! Implementation of `flintext clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::manifest::Manifest;
use crate::util::config::{Config, DEFAULT_DIST_DIR};
use crate::util::fs::remove_dir_all_if_exists;

/// Options for the clean command.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Also remove the source distribution directory
    pub all: bool,
}

/// Remove build outputs. Returns the directories that existed and were
/// removed.
pub fn clean(manifest: &Manifest, config: &Config, opts: &CleanOptions) -> Result<Vec<PathBuf>> {
    let root = manifest.root();
    let mut dirs = vec![config.build_dir(root)];
    if opts.all {
        dirs.push(root.join(DEFAULT_DIST_DIR));
    }

    let mut removed = Vec::new();
    for dir in dirs {
        if remove_dir_all_if_exists(&dir)? {
            tracing::info!("Removed {}", dir.display());
            removed.push(dir);
        }
    }
    Ok(removed)
}
