//! Implementation of `flintext build_ext`.
//!
//! The build runs in two halves. [`prepare`] works out what to build
//! (sources, libraries, search paths) and checks the sources exist without
//! touching any tool. [`build`] then compiles, registers and links each
//! extension through a [`BuildContext`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::builder::compile::{ensure_sources_exist, CompileJob, CompileSettings, SourceCompiler};
use crate::builder::context::BuildContext;
use crate::builder::discover::{discover_sources, select_sources, DiscoveredSources, SourceOrigin};
use crate::builder::interpreter::{probe_or_warn, InterpreterInfo};
use crate::builder::link::{link_command, link_extension, module_output_path, LinkedModule};
use crate::builder::runner::ProcessRunner;
use crate::builder::search_paths::{resolve_search_paths, system_include_dirs, system_library_dirs};
use crate::builder::toolchain::{parse_defines, CommandSpec};
use crate::core::errors::BuildError;
use crate::core::extension::{BuildConfiguration, SearchPaths};
use crate::core::manifest::{ExtensionSpec, Manifest};
use crate::core::platform::{resolve_platform_libraries, with_extra_libraries, PlatformId, PlatformProfile};
use crate::util::config::Config;
use crate::util::fs::{copy_file, resolve_against};

/// Host facts and configuration shared by every build step.
#[derive(Debug, Clone)]
pub struct BuildEnvironment {
    /// Platform the extension is built for
    pub platform: PlatformId,

    /// Merged tool configuration
    pub config: Config,

    /// What the host interpreter reported, if it could be probed
    pub interpreter: Option<InterpreterInfo>,
}

impl BuildEnvironment {
    pub fn new(platform: PlatformId, config: Config) -> Self {
        BuildEnvironment {
            platform,
            config,
            interpreter: None,
        }
    }

    pub fn with_interpreter(mut self, interpreter: Option<InterpreterInfo>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Probe the configured (or PATH) interpreter. Failure leaves the
    /// environment without one.
    pub fn probe_interpreter(mut self) -> Self {
        self.interpreter = probe_or_warn(&self.config.toolchain, &ProcessRunner);
        self
    }

    /// Build directory: the option if given, else config, both relative to
    /// the project root.
    pub fn build_dir(&self, manifest: &Manifest, opts: &BuildExtOptions) -> PathBuf {
        match &opts.build_dir {
            Some(dir) => resolve_against(manifest.root(), dir),
            None => self.config.build_dir(manifest.root()),
        }
    }
}

/// Options for the build_ext command.
#[derive(Debug, Clone, Default)]
pub struct BuildExtOptions {
    /// Include directories appended after the manifest's
    pub include_dirs: Vec<PathBuf>,

    /// Library directories appended after the manifest's
    pub library_dirs: Vec<PathBuf>,

    /// Copy built modules into the project tree
    pub inplace: bool,

    /// Override the build directory
    pub build_dir: Option<PathBuf>,
}

/// One extension, resolved and ready to compile.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedExtension {
    pub name: String,
    pub origin: SourceOrigin,
    pub sources: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlisted: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub search_paths: SearchPaths,
    pub define_macros: Vec<String>,
    pub directives: BTreeMap<String, toml::Value>,
}

impl PreparedExtension {
    pub fn compile_settings(&self) -> CompileSettings {
        CompileSettings {
            defines: parse_defines(&self.define_macros),
            directives: self.directives.clone(),
        }
    }
}

/// Resolve every declared extension: sources, libraries and search paths.
///
/// No tool runs here. Missing sources are reported before anything is
/// compiled.
pub fn prepare(
    manifest: &Manifest,
    env: &BuildEnvironment,
    opts: &BuildExtOptions,
) -> Result<Vec<PreparedExtension>> {
    if manifest.extensions.is_empty() {
        return Err(BuildError::config("no [[extension]] is declared in the manifest").into());
    }

    let profile = PlatformProfile::from_section(&manifest.platform)?;
    let platform_libraries = resolve_platform_libraries(&profile, env.platform);
    tracing::debug!(
        "platform {}: linking {}",
        env.platform,
        platform_libraries.join(", ")
    );

    let defaults = SearchPaths {
        include_dirs: system_include_dirs(env.platform, env.interpreter.as_ref()),
        library_dirs: system_library_dirs(env.platform, env.interpreter.as_ref()),
    };

    manifest
        .extensions
        .iter()
        .map(|ext| prepare_extension(manifest, ext, &platform_libraries, &defaults, opts))
        .collect()
}

fn prepare_extension(
    manifest: &Manifest,
    ext: &ExtensionSpec,
    platform_libraries: &[String],
    defaults: &SearchPaths,
    opts: &BuildExtOptions,
) -> Result<PreparedExtension> {
    let explicit: Vec<PathBuf> = ext.sources.iter().map(|s| manifest.resolve(s)).collect();

    let dir = manifest.resolve(&ext.discovery_dir());
    let discovered = if dir.is_dir() {
        discover_sources(&dir, &ext.suffix)?
    } else {
        tracing::debug!("source directory {} does not exist", dir.display());
        DiscoveredSources::default()
    };

    let selection = select_sources(&ext.name, &explicit, &discovered)?;
    ensure_sources_exist(&ext.name, &selection.sources)?;

    let include_extras: Vec<PathBuf> = ext
        .include_dirs
        .iter()
        .map(|d| manifest.resolve(d))
        .chain(opts.include_dirs.iter().cloned())
        .collect();
    let library_extras: Vec<PathBuf> = ext
        .library_dirs
        .iter()
        .map(|d| manifest.resolve(d))
        .chain(opts.library_dirs.iter().cloned())
        .collect();

    Ok(PreparedExtension {
        name: ext.name.clone(),
        origin: selection.origin,
        sources: selection.sources,
        unlisted: selection.unlisted,
        libraries: with_extra_libraries(platform_libraries.to_vec(), &ext.libraries),
        search_paths: SearchPaths {
            include_dirs: resolve_search_paths(&defaults.include_dirs, &include_extras),
            library_dirs: resolve_search_paths(&defaults.library_dirs, &library_extras),
        },
        define_macros: ext.define_macros.clone(),
        directives: ext.directives.clone(),
    })
}

/// Result of a completed build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Registered extension targets
    pub configuration: BuildConfiguration,
    /// Linked modules, one per target
    pub modules: Vec<LinkedModule>,
}

/// Compile, register and link every prepared extension.
pub fn build(prepared: &[PreparedExtension], ctx: &BuildContext) -> Result<BuildOutput> {
    let compiler = SourceCompiler::new(ctx);
    let mut configuration = BuildConfiguration::new();
    let mut modules = Vec::with_capacity(prepared.len());

    for ext in prepared {
        let compiled = compiler.compile_sources(
            &ext.name,
            &ext.sources,
            &ext.search_paths,
            &ext.compile_settings(),
        )?;
        let target = configuration.register_extension(
            &ext.name,
            ext.libraries.clone(),
            compiled,
            &ext.search_paths,
        )?;
        modules.push(link_extension(ctx, target)?);
    }

    Ok(BuildOutput {
        configuration,
        modules,
    })
}

/// Copy built modules into the project tree, next to the package sources.
pub fn copy_inplace(manifest: &Manifest, modules: &[LinkedModule]) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::with_capacity(modules.len());
    for module in modules {
        let dest = manifest.root().join(&module.install_path);
        copy_file(&module.path, &dest)?;
        tracing::info!("Copied {} -> {}", module.name, dest.display());
        copied.push(dest);
    }
    Ok(copied)
}

/// Run the whole build with the host's tools.
pub fn build_ext(
    manifest: &Manifest,
    env: &BuildEnvironment,
    opts: &BuildExtOptions,
) -> Result<BuildOutput> {
    let prepared = prepare(manifest, env, opts)?;
    let ctx = BuildContext::detect(
        &env.config.toolchain,
        env.platform,
        env.build_dir(manifest, opts),
        env.interpreter.as_ref(),
    )?;

    let output = build(&prepared, &ctx)?;
    if opts.inplace {
        copy_inplace(manifest, &output.modules)?;
    }
    Ok(output)
}

/// The commands a build would run, for `--plan`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub platform: PlatformId,
    pub build_dir: PathBuf,
    pub ext_suffix: String,
    pub extensions: Vec<ExtensionPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionPlan {
    #[serde(flatten)]
    pub extension: PreparedExtension,
    pub jobs: Vec<CompileJob>,
    pub link: CommandSpec,
    pub output: PathBuf,
}

/// Lay out the build of every prepared extension without running anything.
pub fn plan(prepared: &[PreparedExtension], ctx: &BuildContext) -> Result<BuildPlan> {
    let compiler = SourceCompiler::new(ctx);
    let mut configuration = BuildConfiguration::new();
    let mut extensions = Vec::with_capacity(prepared.len());

    for ext in prepared {
        let jobs = compiler.jobs(
            &ext.name,
            &ext.sources,
            &ext.search_paths,
            &ext.compile_settings(),
        )?;
        let compiled = jobs.iter().map(CompileJob::compiled).collect();
        let target = configuration.register_extension(
            &ext.name,
            ext.libraries.clone(),
            compiled,
            &ext.search_paths,
        )?;

        extensions.push(ExtensionPlan {
            extension: ext.clone(),
            link: link_command(ctx, target),
            output: module_output_path(ctx, target),
            jobs,
        });
    }

    Ok(BuildPlan {
        platform: ctx.platform,
        build_dir: ctx.build_dir().to_path_buf(),
        ext_suffix: ctx.ext_suffix.clone(),
        extensions,
    })
}

/// Plan the build with conventional tool names; nothing is looked up or run.
pub fn plan_build_ext(
    manifest: &Manifest,
    env: &BuildEnvironment,
    opts: &BuildExtOptions,
) -> Result<BuildPlan> {
    let prepared = prepare(manifest, env, opts)?;
    let ctx = BuildContext::for_plan(
        &env.config.toolchain,
        env.platform,
        env.build_dir(manifest, opts),
        env.interpreter.as_ref(),
    );
    plan(&prepared, &ctx)
}
