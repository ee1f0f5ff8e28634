//! `flintext build_ext` command

use std::path::Path;

use anyhow::Result;

use super::Project;
use crate::cli::BuildExtArgs;
use flintext::ops::build_ext::{build_ext, copy_inplace, plan_build_ext, BuildExtOptions};

pub fn execute(args: BuildExtArgs, manifest_path: Option<&Path>) -> Result<()> {
    let project = Project::load(manifest_path)?;
    let env = project.environment();

    let opts = BuildExtOptions {
        include_dirs: project.cli_paths(&args.include_dirs),
        library_dirs: project.cli_paths(&args.library_dirs),
        inplace: args.inplace,
        build_dir: project.cli_path(args.build_dir.as_ref()),
    };

    if args.plan {
        let plan = plan_build_ext(&project.manifest, &env, &opts)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let output = build_ext(
        &project.manifest,
        &env,
        &BuildExtOptions {
            inplace: false,
            ..opts
        },
    )?;
    for module in &output.modules {
        eprintln!("    Finished {} ({})", module.name, module.path.display());
    }

    if args.inplace {
        for path in copy_inplace(&project.manifest, &output.modules)? {
            eprintln!("      Copied {}", path.display());
        }
    }

    Ok(())
}
