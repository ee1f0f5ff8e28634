//! The compile pass: binding sources to object files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::toolchain::{CommandSpec, CompileInput};
use crate::builder::translate::needs_translation;
use crate::core::errors::BuildError;
use crate::core::extension::{CompiledSource, SearchPaths};
use crate::util::fs::ensure_dir;

/// Per-extension compile settings beyond the search paths.
#[derive(Debug, Clone, Default)]
pub struct CompileSettings {
    /// Preprocessor defines (name, optional value)
    pub defines: Vec<(String, Option<String>)>,
    /// Translator directives
    pub directives: BTreeMap<String, toml::Value>,
}

/// The commands that turn one source into an object file.
#[derive(Debug, Clone, Serialize)]
pub struct CompileJob {
    pub source: PathBuf,
    pub generated: Option<PathBuf>,
    pub object: PathBuf,
    pub translate: Option<CommandSpec>,
    pub compile: CommandSpec,
}

impl CompileJob {
    /// The compiled source this job produces.
    pub fn compiled(&self) -> CompiledSource {
        CompiledSource {
            source: self.source.clone(),
            generated: self.generated.clone(),
            object: self.object.clone(),
        }
    }
}

/// Check that there is something to compile and that all of it exists.
pub fn ensure_sources_exist(name: &str, sources: &[PathBuf]) -> Result<(), BuildError> {
    if sources.is_empty() {
        return Err(BuildError::EmptyExtension {
            name: name.to_string(),
        });
    }
    for source in sources {
        if !source.is_file() {
            return Err(BuildError::MissingSource {
                path: source.clone(),
            });
        }
    }
    Ok(())
}

/// Runs the translator and C compiler over an extension's sources.
pub struct SourceCompiler<'a> {
    ctx: &'a BuildContext,
}

impl<'a> SourceCompiler<'a> {
    pub fn new(ctx: &'a BuildContext) -> Self {
        SourceCompiler { ctx }
    }

    /// Lay out the commands for every source, in source order. Nothing runs.
    pub fn jobs(
        &self,
        name: &str,
        sources: &[PathBuf],
        search_paths: &SearchPaths,
        settings: &CompileSettings,
    ) -> Result<Vec<CompileJob>, BuildError> {
        let temp_dir = self.ctx.temp_dir(name);
        let obj_ext = self.ctx.toolchain().object_extension();
        let mut jobs: Vec<CompileJob> = Vec::with_capacity(sources.len());

        for source in sources {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    BuildError::config(format!("source `{}` has no file name", source.display()))
                })?;
            let object = temp_dir.join(format!("{}.{}", stem, obj_ext));
            if jobs.iter().any(|j| j.object == object) {
                return Err(BuildError::config(format!(
                    "sources of extension `{}` share the file stem `{}`",
                    name, stem
                )));
            }

            let (generated, translate) = if needs_translation(source) {
                let c_file = temp_dir.join(format!("{}.c", stem));
                let cmd = self.ctx.translator().translate_command(
                    name,
                    source,
                    &c_file,
                    &search_paths.include_dirs,
                    &settings.directives,
                );
                (Some(c_file), Some(cmd))
            } else {
                (None, None)
            };

            let input = CompileInput {
                source: generated.clone().unwrap_or_else(|| source.clone()),
                output: object.clone(),
                include_dirs: search_paths.include_dirs.clone(),
                defines: settings.defines.clone(),
                cflags: self.ctx.cflags.clone(),
            };
            let compile = self.ctx.toolchain().compile_command(&input);

            jobs.push(CompileJob {
                source: source.clone(),
                generated,
                object,
                translate,
                compile,
            });
        }

        Ok(jobs)
    }

    /// Compile every source of extension `name` to an object file.
    ///
    /// Fails with [`BuildError::MissingSource`] before any tool runs when a
    /// source is absent, and with [`BuildError::Compile`] on the first tool
    /// failure.
    pub fn compile_sources(
        &self,
        name: &str,
        sources: &[PathBuf],
        search_paths: &SearchPaths,
        settings: &CompileSettings,
    ) -> Result<Vec<CompiledSource>> {
        ensure_sources_exist(name, sources)?;
        let jobs = self.jobs(name, sources, search_paths, settings)?;
        ensure_dir(&self.ctx.temp_dir(name))?;

        tracing::info!("Compiling {} ({} source(s))", name, jobs.len());

        let mut compiled = Vec::with_capacity(jobs.len());
        for job in &jobs {
            if let Some(translate) = &job.translate {
                tracing::debug!("Translating {}", job.source.display());
                self.run_step(translate, &job.source)?;
            }
            tracing::debug!("Compiling {} -> {}", job.source.display(), job.object.display());
            self.run_step(&job.compile, &job.source)?;
            compiled.push(job.compiled());
        }

        Ok(compiled)
    }

    fn run_step(&self, cmd: &CommandSpec, source: &Path) -> Result<()> {
        tracing::debug!("Running `{}`", cmd);
        let output = self.ctx.runner().run(cmd)?;
        if !output.success {
            return Err(BuildError::Compile {
                source_path: source.to_path_buf(),
                tool: cmd.tool_name(),
                diagnostic: output.diagnostic(),
            }
            .into());
        }
        Ok(())
    }
}
