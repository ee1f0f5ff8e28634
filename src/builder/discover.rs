//! Binding source discovery.
//!
//! Listing is done once, when [`discover_sources`] is called; the directory
//! handle is released before it returns. The snapshot is sorted, so iterating
//! it again yields the same sequence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::errors::BuildError;

/// Snapshot of the binding sources found in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredSources {
    paths: Vec<PathBuf>,
}

impl DiscoveredSources {
    /// A fresh pass over the snapshot.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl<'a> IntoIterator for &'a DiscoveredSources {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// List the regular files directly inside `dir` whose extension equals
/// `suffix` (a leading dot is ignored). Not recursive. Symlinks count when
/// they point at a regular file.
///
/// Returned paths are `dir` joined with the file name, sorted by file name.
pub fn discover_sources(dir: &Path, suffix: &str) -> Result<DiscoveredSources> {
    let suffix = suffix.trim_start_matches('.');
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("failed to list sources in {}", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == suffix);
        if matches {
            paths.push(entry.into_path());
        }
    }

    tracing::debug!(
        "discovered {} `.{}` source(s) in {}",
        paths.len(),
        suffix,
        dir.display()
    );

    Ok(DiscoveredSources { paths })
}

/// Where the selected source list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceOrigin {
    /// The manifest's `sources` list
    Explicit,
    /// Directory discovery
    Discovered,
}

/// The sources an extension is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    pub sources: Vec<PathBuf>,
    pub origin: SourceOrigin,
    /// Discovered files missing from an explicit list
    pub unlisted: Vec<PathBuf>,
}

/// Pick the sources of extension `name`.
///
/// A non-empty explicit list wins; discovery then only reports files the list
/// leaves out. Without one the discovered files are used.
pub fn select_sources(
    name: &str,
    explicit: &[PathBuf],
    discovered: &DiscoveredSources,
) -> Result<SourceSelection, BuildError> {
    if !explicit.is_empty() {
        let unlisted: Vec<PathBuf> = discovered
            .iter()
            .filter(|found| !explicit.iter().any(|listed| listed == *found))
            .cloned()
            .collect();
        for path in &unlisted {
            tracing::warn!(
                "`{}` is not listed in the sources of extension `{}` and will not be built",
                path.display(),
                name
            );
        }
        return Ok(SourceSelection {
            sources: explicit.to_vec(),
            origin: SourceOrigin::Explicit,
            unlisted,
        });
    }

    if discovered.is_empty() {
        return Err(BuildError::EmptyExtension {
            name: name.to_string(),
        });
    }

    Ok(SourceSelection {
        sources: discovered.iter().cloned().collect(),
        origin: SourceOrigin::Discovered,
        unlisted: Vec::new(),
    })
}
