//! `flintext sdist` command

use std::path::Path;

use anyhow::Result;

use super::Project;
use crate::cli::SdistArgs;
use flintext::ops::sdist::{sdist, SdistOptions};

pub fn execute(args: SdistArgs, manifest_path: Option<&Path>) -> Result<()> {
    let project = Project::load(manifest_path)?;
    let opts = SdistOptions {
        dist_dir: project.cli_path(args.dist_dir.as_ref()),
    };

    let report = sdist(&project.manifest, &opts)?;
    eprintln!(
        "    Packaged {} file(s) into {}",
        report.members.len(),
        report.archive.display()
    );

    Ok(())
}
