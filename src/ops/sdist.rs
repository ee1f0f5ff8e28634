//! Implementation of `flintext sdist`.
//!
//! Writes `<name>-<version>.tar.gz` holding the manifest, the binding
//! sources, project-local include directories, any `[sdist] include` globs and
//! a generated `PKG-INFO`, all under a `<name>-<version>/` prefix.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, Header};

use crate::builder::discover::discover_sources;
use crate::core::errors::BuildError;
use crate::core::manifest::Manifest;
use crate::core::metadata::describe_package;
use crate::util::config::DEFAULT_DIST_DIR;
use crate::util::fs::{ensure_dir, files_recursive, glob_files, is_inside, relative_path, resolve_against};

/// Options for the sdist command.
#[derive(Debug, Clone, Default)]
pub struct SdistOptions {
    /// Output directory (default `dist/` under the project root)
    pub dist_dir: Option<PathBuf>,
}

/// What an sdist run wrote.
#[derive(Debug, Clone)]
pub struct SdistReport {
    pub archive: PathBuf,
    /// Archive member names, in archive order
    pub members: Vec<String>,
}

/// Project-relative paths of every file that goes into the archive.
pub fn collect_sdist_files(manifest: &Manifest) -> Result<Vec<PathBuf>> {
    let root = manifest.root();
    let mut files: Vec<PathBuf> = vec![manifest.manifest_path.clone()];

    for ext in &manifest.extensions {
        for source in &ext.sources {
            let path = manifest.resolve(source);
            if !path.is_file() {
                return Err(BuildError::MissingSource { path }.into());
            }
            files.push(path);
        }

        let dir = manifest.resolve(&ext.discovery_dir());
        if dir.is_dir() {
            files.extend(discover_sources(&dir, &ext.suffix)?.into_vec());
        }

        for include in &ext.include_dirs {
            let dir = manifest.resolve(include);
            if dir.is_dir() && is_inside(&dir, root) {
                files.extend(files_recursive(&dir)?);
            }
        }
    }

    files.extend(glob_files(root, &manifest.sdist.include)?);

    let mut relative = BTreeSet::new();
    for file in files {
        if !is_inside(&file, root) {
            tracing::warn!("skipping {}: outside the project", file.display());
            continue;
        }
        relative.insert(relative_path(root, &file));
    }
    Ok(relative.into_iter().collect())
}

/// Build the source archive.
pub fn sdist(manifest: &Manifest, opts: &SdistOptions) -> Result<SdistReport> {
    let definition = describe_package(manifest)?;
    let prefix = definition.metadata.dist_name();
    let root = manifest.root();

    let dist_dir = match &opts.dist_dir {
        Some(dir) => resolve_against(root, dir),
        None => root.join(DEFAULT_DIST_DIR),
    };
    ensure_dir(&dist_dir)?;

    let files = collect_sdist_files(manifest)?;
    let archive = dist_dir.join(format!("{}.tar.gz", prefix));
    let file = File::create(&archive)
        .with_context(|| format!("failed to create {}", archive.display()))?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

    let mut members = Vec::with_capacity(files.len() + 1);
    for rel in &files {
        let name = member_name(&prefix, rel);
        builder
            .append_path_with_name(root.join(rel), &name)
            .with_context(|| format!("failed to add {} to archive", rel.display()))?;
        members.push(name);
    }

    let pkg_info = definition.metadata.to_pkg_info();
    let name = format!("{}/PKG-INFO", prefix);
    let mut header = Header::new_gnu();
    header.set_size(pkg_info.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    );
    builder
        .append_data(&mut header, &name, pkg_info.as_bytes())
        .context("failed to add PKG-INFO to archive")?;
    members.push(name);

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .with_context(|| format!("failed to write {}", archive.display()))?;

    tracing::info!("Wrote {} ({} files)", archive.display(), members.len());
    Ok(SdistReport { archive, members })
}

fn member_name(prefix: &str, rel: &Path) -> String {
    let mut name = prefix.to_string();
    for component in rel.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}
