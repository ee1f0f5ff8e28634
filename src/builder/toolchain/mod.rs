//! Toolchain abstraction for the native compiler pass.
//!
//! Generates compile and link commands for extension modules across
//! toolchains (GCC, Clang, MSVC). Commands are plain data; running them is the
//! job of a [`CommandRunner`](crate::builder::runner::CommandRunner).
//!
//! Toolchain detection priority:
//! 1. Config file (`toolchain.cc` in `.flintext/config.toml` or `~/.flintext/config.toml`)
//! 2. Auto-detection (searching PATH for common compilers)

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_toolchain, fallback_toolchain, family_from_path};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute: program and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Short program name for messages (`gcc`, `cython`).
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// C source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Preprocessor defines (name, optional value)
    pub defines: Vec<(String, Option<String>)>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
}

/// Input for linking an extension module.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Object files to link
    pub objects: Vec<PathBuf>,
    /// Output module file
    pub output: PathBuf,
    /// Library search paths
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link (without -l prefix)
    pub libs: Vec<String>,
    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// The platform/family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Apple Clang (macOS)
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::AppleClang => "apple-clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a command compiling one C file to an object file.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate a command linking objects into a loadable extension module.
    fn link_module_command(&self, input: &LinkInput) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;
}

/// Split `NAME=VALUE` define strings into name/value pairs.
pub fn parse_defines(defines: &[String]) -> Vec<(String, Option<String>)> {
    defines
        .iter()
        .map(|d| match d.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (d.clone(), None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display() {
        let cmd = CommandSpec::new("/usr/bin/gcc")
            .arg("-c")
            .arg("-I/opt/my include")
            .arg("pyflint.c");
        assert_eq!(cmd.to_string(), "/usr/bin/gcc -c \"-I/opt/my include\" pyflint.c");
        assert_eq!(cmd.tool_name(), "gcc");
    }

    #[test]
    fn test_parse_defines() {
        let defines = parse_defines(&["NDEBUG".to_string(), "FLINT_VERSION=2".to_string()]);
        assert_eq!(
            defines,
            vec![
                ("NDEBUG".to_string(), None),
                ("FLINT_VERSION".to_string(), Some("2".to_string())),
            ]
        );
    }
}
