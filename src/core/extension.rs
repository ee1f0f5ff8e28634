//! Extension targets and the build configuration that collects them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::BuildError;

/// Resolved include and library search directories, in search order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPaths {
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
}

/// One binding source after the compile pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSource {
    /// The binding source as declared
    pub source: PathBuf,
    /// Translated C file, if the source needed translation
    pub generated: Option<PathBuf>,
    /// Object file ready for linking
    pub object: PathBuf,
}

/// A natively-loadable module to link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionTarget {
    /// Importable module name
    pub name: String,
    /// Compiled translation units, in source order
    pub compiled: Vec<CompiledSource>,
    /// Native libraries, in link order
    pub libraries: Vec<String>,
    /// Include directories used for compilation
    pub include_dirs: Vec<PathBuf>,
    /// Library search directories for linking
    pub library_dirs: Vec<PathBuf>,
}

impl ExtensionTarget {
    /// Object files in link order.
    pub fn objects(&self) -> impl Iterator<Item = &Path> {
        self.compiled.iter().map(|c| c.object.as_path())
    }

    /// Module path relative to an install root, without the file suffix
    /// (`flint.sub` -> `flint/sub`).
    pub fn module_path(&self) -> PathBuf {
        self.name.split('.').collect()
    }
}

/// The list of extension targets produced by one build invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildConfiguration {
    targets: Vec<ExtensionTarget>,
}

impl BuildConfiguration {
    pub fn new() -> Self {
        BuildConfiguration::default()
    }

    /// Registered targets, in registration order.
    pub fn targets(&self) -> &[ExtensionTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Assemble an extension target and append it to the target list.
    ///
    /// Fails without touching the list when `compiled_sources` is empty.
    pub fn register_extension(
        &mut self,
        name: &str,
        libraries: Vec<String>,
        compiled_sources: Vec<CompiledSource>,
        search_paths: &SearchPaths,
    ) -> Result<&ExtensionTarget, BuildError> {
        if compiled_sources.is_empty() {
            return Err(BuildError::EmptyExtension {
                name: name.to_string(),
            });
        }

        tracing::debug!(
            "registering extension `{}` ({} object(s), libraries: {})",
            name,
            compiled_sources.len(),
            libraries.join(", ")
        );

        self.targets.push(ExtensionTarget {
            name: name.to_string(),
            compiled: compiled_sources,
            libraries,
            include_dirs: search_paths.include_dirs.clone(),
            library_dirs: search_paths.library_dirs.clone(),
        });

        Ok(&self.targets[self.targets.len() - 1])
    }
}
