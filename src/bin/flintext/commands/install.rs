//! `flintext install` command

use std::path::Path;

use anyhow::Result;

use super::Project;
use crate::cli::InstallArgs;
use flintext::ops::build_ext::BuildExtOptions;
use flintext::ops::install::{install, InstallOptions};

pub fn execute(args: InstallArgs, manifest_path: Option<&Path>) -> Result<()> {
    let project = Project::load(manifest_path)?;
    let env = project.environment();

    let build_opts = BuildExtOptions {
        include_dirs: project.cli_paths(&args.build.include_dirs),
        library_dirs: project.cli_paths(&args.build.library_dirs),
        inplace: false,
        build_dir: project.cli_path(args.build.build_dir.as_ref()),
    };
    let opts = InstallOptions {
        root: project.cli_path(args.root.as_ref()),
    };

    let report = install(&project.manifest, &env, &build_opts, &opts)?;
    eprintln!(
        "   Installed {} file(s) into {}",
        report.entries.len(),
        report.root.display()
    );
    eprintln!("      Record {}", report.record.display());

    Ok(())
}
