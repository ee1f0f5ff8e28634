//! Command implementations

pub mod build_ext;
pub mod clean;
pub mod completions;
pub mod describe;
pub mod discover;
pub mod install;
pub mod sdist;

use std::path::{Path, PathBuf};

use anyhow::Result;

use flintext::core::platform::PlatformId;
use flintext::ops::BuildEnvironment;
use flintext::util::fs::resolve_against;
use flintext::util::{Config, GlobalContext};
use flintext::Manifest;

/// The loaded project a command works on.
pub struct Project {
    pub ctx: GlobalContext,
    pub manifest: Manifest,
    pub config: Config,
}

impl Project {
    /// Locate and load the manifest and the merged configuration.
    pub fn load(manifest_path: Option<&Path>) -> Result<Self> {
        let ctx = GlobalContext::new()?;
        let path = ctx.locate_manifest(manifest_path)?;
        let manifest = Manifest::load(&path)?;
        let config = ctx.load_config(manifest.root());
        Ok(Project {
            ctx,
            manifest,
            config,
        })
    }

    /// Host platform and interpreter for a build. The platform is read here,
    /// once, and passed down from then on.
    pub fn environment(&self) -> BuildEnvironment {
        BuildEnvironment::new(PlatformId::host(), self.config.clone()).probe_interpreter()
    }

    /// Resolve command-line paths against the working directory.
    pub fn cli_paths(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        paths
            .iter()
            .map(|p| resolve_against(self.ctx.cwd(), p))
            .collect()
    }

    pub fn cli_path(&self, path: Option<&PathBuf>) -> Option<PathBuf> {
        path.map(|p| resolve_against(self.ctx.cwd(), p))
    }
}
