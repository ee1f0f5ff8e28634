//! Linking extension targets into loadable modules.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::toolchain::{CommandSpec, LinkInput};
use crate::core::errors::BuildError;
use crate::core::extension::ExtensionTarget;
use crate::util::fs::ensure_dir;

/// A module written by the link pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedModule {
    /// Importable module name
    pub name: String,
    /// Path of the module file inside the build directory
    pub path: PathBuf,
    /// Path relative to an install root (`flint/arb.so` for `flint.arb`)
    pub install_path: PathBuf,
}

/// Module file name relative to an install root.
pub fn module_file(target: &ExtensionTarget, suffix: &str) -> PathBuf {
    let mut path = target.module_path();
    let file_name = format!(
        "{}{}",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.name.clone()),
        suffix
    );
    path.set_file_name(file_name);
    path
}

/// Where the linked module of `target` is written.
pub fn module_output_path(ctx: &BuildContext, target: &ExtensionTarget) -> PathBuf {
    ctx.lib_dir().join(module_file(target, &ctx.ext_suffix))
}

/// The link command for `target`.
pub fn link_command(ctx: &BuildContext, target: &ExtensionTarget) -> CommandSpec {
    let input = LinkInput {
        objects: target.objects().map(|o| o.to_path_buf()).collect(),
        output: module_output_path(ctx, target),
        lib_dirs: target.library_dirs.clone(),
        libs: target.libraries.clone(),
        ldflags: ctx.ldflags.clone(),
    };
    ctx.toolchain().link_module_command(&input)
}

/// Link the objects of `target` into a shared module.
pub fn link_extension(ctx: &BuildContext, target: &ExtensionTarget) -> Result<LinkedModule> {
    let output = module_output_path(ctx, target);
    if let Some(parent) = output.parent() {
        ensure_dir(parent)?;
    }

    let cmd = link_command(ctx, target);
    tracing::info!("Linking {} -> {}", target.name, output.display());
    tracing::debug!("Running `{}`", cmd);

    let result = ctx.runner().run(&cmd)?;
    if !result.success {
        return Err(BuildError::Link {
            target: target.name.clone(),
            diagnostic: result.diagnostic(),
        }
        .into());
    }

    Ok(LinkedModule {
        name: target.name.clone(),
        path: output,
        install_path: module_file(target, &ctx.ext_suffix),
    })
}
