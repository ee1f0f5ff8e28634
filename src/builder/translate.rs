//! The binding source-to-native pass.
//!
//! Binding sources (`.pyx`) mix C declarations with interpreter syntax and
//! are translated to C by Cython before the native compiler sees them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::toolchain::CommandSpec;
use crate::util::config::ToolchainSettings;
use crate::util::diagnostic::suggestions;
use crate::util::process::{find_any_executable, find_executable};

/// Suffixes of sources that need translation before compilation.
const BINDING_SUFFIXES: &[&str] = &["pyx", "py"];

/// Whether `source` must go through the translator.
pub fn needs_translation(source: &Path) -> bool {
    source
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINDING_SUFFIXES.contains(&ext))
}

/// Cython invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CythonTranslator {
    program: PathBuf,
}

impl CythonTranslator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CythonTranslator {
            program: program.into(),
        }
    }

    /// Find Cython from config or PATH.
    pub fn detect(settings: &ToolchainSettings) -> Result<Self> {
        if let Some(configured) = &settings.cython {
            if let Some(path) = find_executable(configured) {
                return Ok(CythonTranslator::new(path));
            }
            tracing::warn!("Configured Cython not found: {}", configured.display());
        }

        match find_any_executable(&["cython", "cython3"]) {
            Some(path) => Ok(CythonTranslator::new(path)),
            None => bail!("Cython not found in PATH\n{}", suggestions::NO_CYTHON),
        }
    }

    /// Translator named by config, or plain `cython`, without checking it
    /// exists. Used when only printing a build plan.
    pub fn fallback(settings: &ToolchainSettings) -> Self {
        CythonTranslator::new(
            settings
                .cython
                .clone()
                .unwrap_or_else(|| PathBuf::from("cython")),
        )
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command translating `source` into the C file `output`.
    ///
    /// Cython names the module after the source file; `--module-name` is
    /// passed when that differs from `module`, so the generated init function
    /// matches the name the module is linked and imported under.
    pub fn translate_command(
        &self,
        module: &str,
        source: &Path,
        output: &Path,
        include_dirs: &[PathBuf],
        directives: &BTreeMap<String, toml::Value>,
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program);

        if source.file_stem().and_then(|s| s.to_str()) != Some(module) {
            cmd = cmd.arg("--module-name").arg(module);
        }

        for (name, value) in directives {
            cmd = cmd.arg("-X").arg(format!("{}={}", name, directive_value(value)));
        }

        for dir in include_dirs {
            cmd = cmd.arg("-I").arg(dir.display().to_string());
        }

        cmd.arg(source.display().to_string())
            .arg("-o")
            .arg(output.display().to_string())
    }
}

/// Render a directive value the way Cython's option parser expects it.
fn directive_value(value: &toml::Value) -> String {
    match value {
        toml::Value::Boolean(true) => "True".to_string(),
        toml::Value::Boolean(false) => "False".to_string(),
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_translation() {
        assert!(needs_translation(Path::new("src/pyflint.pyx")));
        assert!(!needs_translation(Path::new("src/helpers.c")));
        assert!(!needs_translation(Path::new("src/flint.pxd")));
    }

    #[test]
    fn test_translate_command_passes_directives() {
        let mut directives = BTreeMap::new();
        directives.insert("embedsignature".to_string(), toml::Value::Boolean(true));
        directives.insert("language_level".to_string(), toml::Value::Integer(3));

        let cmd = CythonTranslator::new("cython").translate_command(
            "flint",
            Path::new("src/pyflint.pyx"),
            Path::new("build/temp/flint/pyflint.c"),
            &[PathBuf::from("src")],
            &directives,
        );

        assert_eq!(
            cmd.args,
            vec![
                "--module-name",
                "flint",
                "-X",
                "embedsignature=True",
                "-X",
                "language_level=3",
                "-I",
                "src",
                "src/pyflint.pyx",
                "-o",
                "build/temp/flint/pyflint.c",
            ]
        );
    }

    #[test]
    fn test_module_name_omitted_when_stem_matches() {
        let cmd = CythonTranslator::new("cython").translate_command(
            "flint",
            Path::new("src/flint.pyx"),
            Path::new("build/temp/flint/flint.c"),
            &[],
            &BTreeMap::new(),
        );

        assert!(!cmd.args.contains(&"--module-name".to_string()));
        assert_eq!(cmd.args, vec!["src/flint.pyx", "-o", "build/temp/flint/flint.c"]);
    }

    #[test]
    fn test_fallback_translator() {
        let settings = ToolchainSettings::default();
        assert_eq!(CythonTranslator::fallback(&settings).program(), Path::new("cython"));
    }
}
