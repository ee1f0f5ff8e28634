//! Extension module build pipeline.
//!
//! Discovers binding sources, resolves search paths, runs the translator and
//! native compiler over every source and links the objects into a module.
//! Each pass is sequential and stops at the first failure.

pub mod compile;
pub mod context;
pub mod discover;
pub mod interpreter;
pub mod link;
pub mod runner;
pub mod search_paths;
pub mod toolchain;
pub mod translate;

pub use compile::{ensure_sources_exist, CompileJob, CompileSettings, SourceCompiler};
pub use context::BuildContext;
pub use discover::{discover_sources, select_sources, DiscoveredSources, SourceOrigin, SourceSelection};
pub use interpreter::InterpreterInfo;
pub use link::{link_extension, LinkedModule};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use search_paths::resolve_search_paths;
pub use toolchain::{detect_toolchain, CommandSpec, GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};
pub use translate::CythonTranslator;
