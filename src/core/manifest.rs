//! Flintext.toml manifest parsing and schema.
//!
//! The manifest declares the package metadata and every native extension the
//! package builds. Metadata is validated later by
//! [`describe_package`](crate::core::metadata::describe_package) so that a
//! manifest with missing fields can still be loaded and reported on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::metadata::VersionSpec;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Flintext.toml";

/// Default file suffix of binding sources.
pub const DEFAULT_SOURCE_SUFFIX: &str = "pyx";

/// The `[package]` table, as written. Required fields are optional here and
/// checked when the package is described.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageSection {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<VersionSpec>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub author_email: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    /// Trove classifiers
    #[serde(default)]
    pub classifiers: Vec<String>,
}

/// One `[[extension]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionSpec {
    /// Importable module name (e.g. `flint`)
    pub name: String,

    /// Explicit binding sources. When non-empty this list is authoritative
    /// and discovery only reports on it.
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Directory scanned for binding sources.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,

    /// File suffix matched during discovery.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Libraries linked after the platform profile's list.
    #[serde(default)]
    pub libraries: Vec<String>,

    /// Extra include directories, appended after the system defaults.
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Extra library directories, appended after the system defaults.
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,

    /// Preprocessor defines (`NAME` or `NAME=VALUE`).
    #[serde(default)]
    pub define_macros: Vec<String>,

    /// Compiler directives handed to the binding translator.
    #[serde(default)]
    pub directives: BTreeMap<String, toml::Value>,
}

fn default_suffix() -> String {
    DEFAULT_SOURCE_SUFFIX.to_string()
}

impl ExtensionSpec {
    /// Directory scanned during discovery: `source-dir`, else the parent of
    /// the first explicit source, else `src`.
    pub fn discovery_dir(&self) -> PathBuf {
        if let Some(dir) = &self.source_dir {
            return dir.clone();
        }
        self.sources
            .first()
            .and_then(|s| s.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("src"))
    }
}

/// The `[platform]` table: overrides for the library profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSection {
    /// Core libraries linked on every platform
    #[serde(default)]
    pub core: Option<Vec<String>>,

    /// Libraries Windows needs beyond the core set
    #[serde(default)]
    pub windows: Option<Vec<String>>,
}

/// The `[sdist]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdistSection {
    /// Extra glob patterns (relative to the project root) to ship.
    #[serde(default)]
    pub include: Vec<String>,
}

/// The parsed Flintext.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Package metadata as declared
    pub package: PackageSection,

    /// Declared extensions, in manifest order
    pub extensions: Vec<ExtensionSpec>,

    /// Platform library overrides
    pub platform: PlatformSection,

    /// Source distribution settings
    pub sdist: SdistSection,

    /// Path of the manifest file
    pub manifest_path: PathBuf,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    package: PackageSection,

    #[serde(default, rename = "extension")]
    extensions: Vec<ExtensionSpec>,

    #[serde(default)]
    platform: PlatformSection,

    #[serde(default)]
    sdist: SdistSection,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = crate::util::fs::read_to_string(path)?;
        Self::parse(&contents, path)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse manifest text; `path` is recorded as the manifest location.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(contents)?;

        let manifest = Manifest {
            package: raw.package,
            extensions: raw.extensions,
            platform: raw.platform,
            sdist: raw.sdist,
            manifest_path: path.to_path_buf(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut seen: Vec<&str> = Vec::new();
        for ext in &self.extensions {
            let name = ext.name.trim();
            if name.is_empty() {
                return Err(BuildError::config("extension name must not be empty"));
            }
            if name.split('.').any(|part| part.is_empty()) {
                return Err(BuildError::config(format!(
                    "extension name `{}` is not a valid module path",
                    name
                )));
            }
            if seen.contains(&name) {
                return Err(BuildError::config(format!(
                    "extension `{}` is declared more than once",
                    name
                )));
            }
            seen.push(name);
        }
        Ok(())
    }

    /// Directory containing the manifest (the project root).
    pub fn root(&self) -> &Path {
        self.manifest_path.parent().unwrap_or(Path::new("."))
    }

    /// Resolve a manifest-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::util::fs::resolve_against(self.root(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON_FLINT: &str = r#"
[package]
name = "python-flint"
version = "0.1.2"
description = "bindings for FLINT"
url = "https://github.com/fredrik-johansson/python-flint"
author = "Fredrik Johansson"
author-email = "fredrik.johansson@gmail.com"
license = "BSD"
classifiers = ["Topic :: Scientific/Engineering :: Mathematics"]

[[extension]]
name = "flint"
sources = ["src/pyflint.pyx"]
include-dirs = ["src"]

[extension.directives]
embedsignature = true
"#;

    #[test]
    fn test_parse_full_manifest() {
        let m = Manifest::parse(PYTHON_FLINT, Path::new("/p/Flintext.toml")).unwrap();

        assert_eq!(m.package.name.as_deref(), Some("python-flint"));
        assert_eq!(
            m.package.version,
            Some(VersionSpec::Fixed("0.1.2".to_string()))
        );
        assert_eq!(m.package.author_email.as_deref(), Some("fredrik.johansson@gmail.com"));
        assert_eq!(m.extensions.len(), 1);

        let ext = &m.extensions[0];
        assert_eq!(ext.name, "flint");
        assert_eq!(ext.sources, vec![PathBuf::from("src/pyflint.pyx")]);
        assert_eq!(ext.suffix, "pyx");
        assert_eq!(ext.directives.get("embedsignature"), Some(&toml::Value::Boolean(true)));
        assert_eq!(m.root(), Path::new("/p"));
    }

    #[test]
    fn test_discovery_dir_defaults() {
        let m = Manifest::parse(PYTHON_FLINT, Path::new("Flintext.toml")).unwrap();
        assert_eq!(m.extensions[0].discovery_dir(), PathBuf::from("src"));

        let m = Manifest::parse(
            "[[extension]]\nname = \"flint\"\nsources = [\"pyflint.pyx\"]\n",
            Path::new("Flintext.toml"),
        )
        .unwrap();
        assert_eq!(m.extensions[0].discovery_dir(), PathBuf::from("src"));
    }

    #[test]
    fn test_duplicate_extension_rejected() {
        let err = Manifest::parse(
            "[[extension]]\nname = \"flint\"\n[[extension]]\nname = \"flint\"\n",
            Path::new("Flintext.toml"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_unknown_table_rejected() {
        let err = Manifest::parse("[packge]\nname = \"x\"\n", Path::new("Flintext.toml"));
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_package_table_still_loads() {
        let m = Manifest::parse("[[extension]]\nname = \"flint\"\n", Path::new("Flintext.toml"))
            .unwrap();
        assert_eq!(m.package, PackageSection::default());
    }
}
