//! High-level operations.
//!
//! This module contains the implementation of flintext commands.

pub mod build_ext;
pub mod clean;
pub mod install;
pub mod sdist;

pub use build_ext::{
    build, build_ext, plan, plan_build_ext, prepare, BuildEnvironment, BuildExtOptions,
    BuildOutput, BuildPlan, PreparedExtension,
};
pub use clean::{clean, CleanOptions};
pub use install::{install, InstallOptions, InstallReport};
pub use sdist::{sdist, SdistOptions, SdistReport};
