//! `flintext clean` command

use std::path::Path;

use anyhow::Result;

use super::Project;
use crate::cli::CleanArgs;
use flintext::ops::clean::{clean, CleanOptions};

pub fn execute(args: CleanArgs, manifest_path: Option<&Path>) -> Result<()> {
    let project = Project::load(manifest_path)?;

    let removed = clean(&project.manifest, &project.config, &CleanOptions { all: args.all })?;
    if removed.is_empty() {
        eprintln!("     Nothing to clean");
    }
    for dir in removed {
        eprintln!("     Removed {}", dir.display());
    }

    Ok(())
}
