//! Core data structures for flintext.
//!
//! - Manifest schema and loading
//! - Package metadata and the package definition
//! - Platform library profiles
//! - Extension targets and the build configuration
//! - Build errors

pub mod errors;
pub mod extension;
pub mod manifest;
pub mod metadata;
pub mod platform;
pub mod vcs;

pub use errors::BuildError;
pub use extension::{BuildConfiguration, CompiledSource, ExtensionTarget, SearchPaths};
pub use manifest::{ExtensionSpec, Manifest, MANIFEST_NAME};
pub use metadata::{describe_package, PackageDefinition, PackageMetadata};
pub use platform::{resolve_platform_libraries, PlatformId, PlatformProfile};
