//! Package descriptor: validated metadata and the package definition handed
//! to the packaging front end.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::manifest::Manifest;
use crate::core::vcs;

/// PEP 440 public version with an optional local segment.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d+(\.\d+)*((a|b|rc)\d+)?(\.post\d+)?(\.dev\d+)?(\+[A-Za-z0-9]+(\.[A-Za-z0-9]+)*)?$",
    )
    .expect("version pattern is valid")
});

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("name pattern is valid"));

/// Separator runs collapsed to `_` in distribution file names.
static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator pattern is valid"));

/// How the package version is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    /// `version = "0.1.2"`
    Fixed(String),
    /// `version = { vcs = true, tag-prefix = "v" }`
    Vcs(VcsVersion),
}

/// Settings for deriving the version from git tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VcsVersion {
    pub vcs: bool,

    /// Prefix stripped from tag names (`v0.1.2` -> `0.1.2`)
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Version used when no repository or no matching tag is found
    #[serde(default)]
    pub fallback: Option<String>,
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

/// Where the resolved version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    Fixed,
    Vcs,
    Fallback,
}

/// Validated package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub classifiers: Vec<String>,
}

impl PackageMetadata {
    /// The `<name>-<version>` stem used for archives and install records.
    pub fn dist_name(&self) -> String {
        format!("{}-{}", SEPARATOR_RUN_RE.replace_all(&self.name, "_"), self.version)
    }

    /// Render core metadata in the `PKG-INFO` format.
    pub fn to_pkg_info(&self) -> String {
        let unknown = "UNKNOWN";
        let mut out = String::new();
        out.push_str("Metadata-Version: 1.1\n");
        out.push_str(&format!("Name: {}\n", self.name));
        out.push_str(&format!("Version: {}\n", self.version));
        out.push_str(&format!(
            "Summary: {}\n",
            self.description.as_deref().unwrap_or(unknown)
        ));
        out.push_str(&format!("Home-page: {}\n", self.url.as_deref().unwrap_or(unknown)));
        out.push_str(&format!("Author: {}\n", self.author.as_deref().unwrap_or(unknown)));
        out.push_str(&format!(
            "Author-email: {}\n",
            self.author_email.as_deref().unwrap_or(unknown)
        ));
        out.push_str(&format!("License: {}\n", self.license.as_deref().unwrap_or(unknown)));
        for classifier in &self.classifiers {
            out.push_str(&format!("Classifier: {}\n", classifier));
        }
        out
    }
}

/// Summary of one declared extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionSummary {
    pub name: String,
    pub sources: Vec<PathBuf>,
}

/// The package definition passed to the packaging front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDefinition {
    #[serde(flatten)]
    pub metadata: PackageMetadata,
    pub version_source: VersionSource,
    pub extensions: Vec<ExtensionSummary>,
}

/// Describe the package declared by `manifest`.
///
/// Fails with [`BuildError::Metadata`] when a required field is absent or
/// malformed; version tags are read from the repository enclosing the
/// manifest when the version is VCS-derived.
pub fn describe_package(manifest: &Manifest) -> Result<PackageDefinition, BuildError> {
    let pkg = &manifest.package;

    let name = required(pkg.name.as_deref(), "name")?;
    if !NAME_RE.is_match(name) {
        return Err(BuildError::metadata(
            "name",
            format!("`{}` must be ASCII letters, digits, `-`, `_` or `.`", name),
        ));
    }

    let spec = pkg
        .version
        .as_ref()
        .ok_or_else(|| BuildError::metadata("version", "is required"))?;
    let (version, version_source) = resolve_version(spec, manifest)?;
    validate_version(&version)?;

    let metadata = PackageMetadata {
        name: name.to_string(),
        version,
        description: non_empty(&pkg.description),
        url: non_empty(&pkg.url),
        author: non_empty(&pkg.author),
        author_email: non_empty(&pkg.author_email),
        license: non_empty(&pkg.license),
        classifiers: pkg.classifiers.clone(),
    };

    let extensions = manifest
        .extensions
        .iter()
        .map(|ext| ExtensionSummary {
            name: ext.name.clone(),
            sources: ext.sources.clone(),
        })
        .collect();

    Ok(PackageDefinition {
        metadata,
        version_source,
        extensions,
    })
}

fn resolve_version(
    spec: &VersionSpec,
    manifest: &Manifest,
) -> Result<(String, VersionSource), BuildError> {
    match spec {
        VersionSpec::Fixed(v) => Ok((v.trim().to_string(), VersionSource::Fixed)),
        VersionSpec::Vcs(vcs_spec) => {
            if !vcs_spec.vcs {
                return Err(BuildError::metadata(
                    "version",
                    "table form requires `vcs = true`",
                ));
            }

            match vcs::version_from_tags(manifest.root(), &vcs_spec.tag_prefix) {
                Ok(Some(v)) => return Ok((v, VersionSource::Vcs)),
                Ok(None) => tracing::debug!("no version tag with prefix `{}`", vcs_spec.tag_prefix),
                Err(e) => tracing::debug!("could not read version from git: {:#}", e),
            }

            match &vcs_spec.fallback {
                Some(fallback) => {
                    tracing::warn!("no version tag found, using fallback version {}", fallback);
                    Ok((fallback.clone(), VersionSource::Fallback))
                }
                None => Err(BuildError::metadata(
                    "version",
                    "could not be derived from git tags and no `fallback` is set",
                )),
            }
        }
    }
}

/// Check that `version` is a PEP 440 style version string.
pub fn validate_version(version: &str) -> Result<(), BuildError> {
    if VERSION_RE.is_match(version) {
        Ok(())
    } else {
        Err(BuildError::metadata(
            "version",
            format!("`{}` is not a valid version", version),
        ))
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, BuildError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BuildError::metadata(field, "is required")),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
