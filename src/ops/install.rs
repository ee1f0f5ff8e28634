//! Implementation of `flintext install`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::link::LinkedModule;
use crate::core::errors::BuildError;
use crate::core::manifest::Manifest;
use crate::core::metadata::{describe_package, PackageMetadata};
use crate::ops::build_ext::{build_ext, BuildEnvironment, BuildExtOptions};
use crate::util::fs::{copy_file, write_string};
use crate::util::hash::{record_hash, sha256_file};

const INSTALLER: &str = "flintext";

/// Options for the install command.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Install root overriding config and the interpreter default
    pub root: Option<PathBuf>,
}

/// One line of an install `RECORD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    /// Path relative to the install root, `/`-separated
    pub path: String,
    /// `sha256=<urlsafe base64>` of the installed file (absent for the
    /// RECORD itself)
    pub hash: Option<String>,
    pub size: Option<u64>,
}

impl RecordEntry {
    fn for_file(root: &Path, rel: &Path) -> Result<Self> {
        let full = root.join(rel);
        let size = std::fs::metadata(&full)?.len();
        Ok(RecordEntry {
            path: record_path(rel),
            hash: Some(record_hash(&sha256_file(&full)?)),
            size: Some(size),
        })
    }

    /// Render as a `RECORD` line.
    pub fn to_line(&self) -> String {
        let hash = self.hash.as_deref().unwrap_or_default();
        let size = self.size.map(|s| s.to_string()).unwrap_or_default();
        format!("{},{},{}", csv_field(&self.path), hash, size)
    }
}

fn record_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// What an install wrote.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub root: PathBuf,
    pub record: PathBuf,
    pub entries: Vec<RecordEntry>,
}

/// Install root: `--root`, else `install.root` from config, else the
/// interpreter's platform library directory.
pub fn install_root(env: &BuildEnvironment, opts: &InstallOptions) -> Result<PathBuf, BuildError> {
    opts.root
        .clone()
        .or_else(|| env.config.install.root.clone())
        .or_else(|| env.interpreter.as_ref().map(|i| i.platlib.clone()))
        .ok_or_else(|| {
            BuildError::config(
                "no install root: pass --root or set `install.root` in .flintext/config.toml",
            )
        })
}

/// Copy built modules under `root` and write the dist-info directory with
/// its `RECORD`.
pub fn install_modules(
    metadata: &PackageMetadata,
    modules: &[LinkedModule],
    root: &Path,
) -> Result<InstallReport> {
    let mut written: Vec<PathBuf> = Vec::with_capacity(modules.len() + 3);

    for module in modules {
        copy_file(&module.path, &root.join(&module.install_path))?;
        tracing::info!("Installed {} -> {}", module.name, root.join(&module.install_path).display());
        written.push(module.install_path.clone());
    }

    let dist_info = PathBuf::from(format!("{}.dist-info", metadata.dist_name()));
    let metadata_file = dist_info.join("METADATA");
    write_string(&root.join(&metadata_file), &metadata.to_pkg_info())?;
    written.push(metadata_file);

    let installer_file = dist_info.join("INSTALLER");
    write_string(&root.join(&installer_file), &format!("{}\n", INSTALLER))?;
    written.push(installer_file);

    let mut entries = written
        .iter()
        .map(|rel| RecordEntry::for_file(root, rel))
        .collect::<Result<Vec<_>>>()?;

    let record_file = dist_info.join("RECORD");
    entries.push(RecordEntry {
        path: record_path(&record_file),
        hash: None,
        size: None,
    });

    let mut contents = String::new();
    for entry in &entries {
        contents.push_str(&entry.to_line());
        contents.push('\n');
    }
    let record = root.join(&record_file);
    write_string(&record, &contents)?;
    tracing::debug!("Wrote {}", record.display());

    Ok(InstallReport {
        root: root.to_path_buf(),
        record,
        entries,
    })
}

/// Build every extension and install it.
pub fn install(
    manifest: &Manifest,
    env: &BuildEnvironment,
    build_opts: &BuildExtOptions,
    opts: &InstallOptions,
) -> Result<InstallReport> {
    let definition = describe_package(manifest)?;
    let root = install_root(env, opts)?;
    let output = build_ext(manifest, env, build_opts)?;
    install_modules(&definition.metadata, &output.modules, &root)
}
