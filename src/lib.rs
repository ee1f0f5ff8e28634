//! flintext - builds the FLINT/Arb binding module from a declarative manifest
//!
//! This crate provides the library behind the `flintext` command: manifest
//! and metadata handling, platform library profiles, the compile and link
//! pipeline, and the install/sdist/clean operations.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for flintext unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording command runner and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    errors::BuildError, extension::BuildConfiguration, manifest::Manifest,
    metadata::PackageDefinition, platform::PlatformId,
};
pub use util::context::GlobalContext;
