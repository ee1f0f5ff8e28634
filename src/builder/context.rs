//! Build context: toolchain, translator and output locations for one build.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::interpreter::{default_ext_suffix, InterpreterInfo};
use crate::builder::runner::{CommandRunner, ProcessRunner};
use crate::builder::toolchain::{detect_toolchain, fallback_toolchain, Toolchain};
use crate::builder::translate::CythonTranslator;
use crate::core::platform::PlatformId;
use crate::util::config::ToolchainSettings;

/// Everything the compile and link passes need besides the sources.
pub struct BuildContext {
    /// Host platform, detected once by the caller
    pub platform: PlatformId,

    /// Root of all build outputs
    pub build_dir: PathBuf,

    /// Extra compiler flags from config
    pub cflags: Vec<String>,

    /// Extra linker flags from config
    pub ldflags: Vec<String>,

    /// File suffix of linked modules
    pub ext_suffix: String,

    toolchain: Box<dyn Toolchain>,
    translator: CythonTranslator,
    runner: Box<dyn CommandRunner>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("platform", &self.platform)
            .field("build_dir", &self.build_dir)
            .field("toolchain", &self.toolchain.platform())
            .field("compiler", &self.toolchain.compiler_path())
            .field("translator", &self.translator.program())
            .field("ext_suffix", &self.ext_suffix)
            .finish()
    }
}

impl BuildContext {
    /// Assemble a context from explicit parts.
    pub fn new(
        platform: PlatformId,
        build_dir: PathBuf,
        toolchain: Box<dyn Toolchain>,
        translator: CythonTranslator,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        BuildContext {
            platform,
            build_dir,
            cflags: Vec::new(),
            ldflags: Vec::new(),
            ext_suffix: default_ext_suffix(platform).to_string(),
            toolchain,
            translator,
            runner,
        }
    }

    /// Find the real tools and run them as subprocesses.
    pub fn detect(
        settings: &ToolchainSettings,
        platform: PlatformId,
        build_dir: PathBuf,
        interpreter: Option<&InterpreterInfo>,
    ) -> Result<Self> {
        let toolchain = detect_toolchain(settings, platform)?;
        let translator = CythonTranslator::detect(settings)?;
        tracing::debug!(
            "toolchain {} ({}), translator {}",
            toolchain.platform().as_str(),
            toolchain.compiler_path().display(),
            translator.program().display()
        );

        Ok(Self::new(platform, build_dir, toolchain, translator, Box::new(ProcessRunner))
            .with_settings(settings)
            .with_interpreter(interpreter))
    }

    /// A context for printing a build plan. Tools are named but never looked
    /// up or run.
    pub fn for_plan(
        settings: &ToolchainSettings,
        platform: PlatformId,
        build_dir: PathBuf,
        interpreter: Option<&InterpreterInfo>,
    ) -> Self {
        Self::new(
            platform,
            build_dir,
            fallback_toolchain(settings, platform),
            CythonTranslator::fallback(settings),
            Box::new(ProcessRunner),
        )
        .with_settings(settings)
        .with_interpreter(interpreter)
    }

    /// Take compiler and linker flags from config.
    pub fn with_settings(mut self, settings: &ToolchainSettings) -> Self {
        self.cflags = settings.cflags.clone();
        self.ldflags = settings.ldflags.clone();
        self
    }

    /// Use the interpreter's module suffix when one was probed.
    pub fn with_interpreter(mut self, interpreter: Option<&InterpreterInfo>) -> Self {
        if let Some(info) = interpreter.filter(|i| !i.ext_suffix.is_empty()) {
            self.ext_suffix = info.ext_suffix.clone();
        }
        self
    }

    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    pub fn translator(&self) -> &CythonTranslator {
        &self.translator
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Intermediate files of extension `name`.
    pub fn temp_dir(&self, name: &str) -> PathBuf {
        self.build_dir.join("temp").join(name)
    }

    /// Directory linked modules are written to.
    pub fn lib_dir(&self) -> PathBuf {
        self.build_dir.join("lib")
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}
