//! `flintext describe` command

use std::path::Path;

use anyhow::Result;

use super::Project;
use flintext::core::metadata::describe_package;

pub fn execute(manifest_path: Option<&Path>) -> Result<()> {
    let project = Project::load(manifest_path)?;
    let definition = describe_package(&project.manifest)?;
    println!("{}", serde_json::to_string_pretty(&definition)?);
    Ok(())
}
