//! `flintext discover` command
//!
//! Lists binding sources found in a directory. Without a directory, each
//! declared extension's source directory is scanned with its own suffix.

use std::path::Path;

use anyhow::Result;

use super::Project;
use crate::cli::DiscoverArgs;
use flintext::builder::discover::discover_sources;
use flintext::util::context::GlobalContext;
use flintext::util::fs::resolve_against;

pub fn execute(args: DiscoverArgs, manifest_path: Option<&Path>) -> Result<()> {
    if let Some(dir) = &args.dir {
        let ctx = GlobalContext::new()?;
        let dir = resolve_against(ctx.cwd(), dir);
        for path in &discover_sources(&dir, &args.suffix)? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let project = Project::load(manifest_path)?;
    for ext in &project.manifest.extensions {
        let dir = project.manifest.resolve(&ext.discovery_dir());
        let found = discover_sources(&dir, &ext.suffix)?;
        tracing::debug!("{}: {} source(s) in {}", ext.name, found.len(), dir.display());
        for path in &found {
            println!("{}", path.display());
        }
    }

    Ok(())
}
