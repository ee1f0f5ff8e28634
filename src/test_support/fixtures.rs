//! Project fixtures for tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::manifest::{Manifest, MANIFEST_NAME};

/// Manifest of the FLINT/Arb binding package with one `flint` extension.
pub const PYTHON_FLINT_MANIFEST: &str = r#"[package]
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

/// A project on disk: manifest plus source files.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Flintext.toml content
    pub manifest: String,
    /// Files relative to the project root, with content
    pub files: Vec<(PathBuf, String)>,
}

impl ProjectFixture {
    pub fn new(manifest: impl Into<String>) -> Self {
        ProjectFixture {
            manifest: manifest.into(),
            files: Vec::new(),
        }
    }

    /// The FLINT/Arb binding project: `src/pyflint.pyx` plus a declaration
    /// file and a header.
    pub fn python_flint() -> Self {
        ProjectFixture::new(PYTHON_FLINT_MANIFEST)
            .with_file("src/pyflint.pyx", "include \"flint.pxd\"\n\ncdef class fmpz:\n    pass\n")
            .with_file("src/flint.pxd", "cdef extern from \"flint/fmpz.h\":\n    ctypedef long fmpz_t\n")
            .with_file("src/pyflint.h", "#define PYFLINT_VERSION \"0.1.2\"\n")
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Write the project into `root` and return the manifest path.
    pub fn write(&self, root: &Path) -> PathBuf {
        fs::create_dir_all(root).unwrap();
        let manifest_path = root.join(MANIFEST_NAME);
        fs::write(&manifest_path, &self.manifest).unwrap();
        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        manifest_path
    }

    /// Write the project and load its manifest.
    pub fn load(&self, root: &Path) -> Manifest {
        Manifest::load(&self.write(root)).unwrap()
    }
}
