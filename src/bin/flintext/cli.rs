//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// flintext - build the FLINT/Arb binding module
#[derive(Parser)]
#[command(name = "flintext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to Flintext.toml (default: search upward from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and link the extension modules
    #[command(name = "build_ext", alias = "build-ext")]
    BuildExt(BuildExtArgs),

    /// Build and install the extension modules
    Install(InstallArgs),

    /// Create a source distribution archive
    Sdist(SdistArgs),

    /// Remove build artifacts
    Clean(CleanArgs),

    /// Print the package definition as JSON
    Describe,

    /// List the binding sources in a directory
    Discover(DiscoverArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Clone)]
pub struct BuildExtArgs {
    /// Extra include directory, searched after the defaults (repeatable)
    #[arg(short = 'I', long = "include-dirs", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Extra library directory, searched after the defaults (repeatable)
    #[arg(short = 'L', long = "library-dirs", value_name = "DIR")]
    pub library_dirs: Vec<PathBuf>,

    /// Copy built modules into the project directory
    #[arg(short, long)]
    pub inplace: bool,

    /// Directory for intermediate and built files
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Print the build plan as JSON without running any tool
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Install root (default: config `install.root`, else the interpreter's site directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub build: InstallBuildArgs,
}

/// Build options accepted by `install`.
#[derive(Args)]
pub struct InstallBuildArgs {
    /// Extra include directory, searched after the defaults (repeatable)
    #[arg(short = 'I', long = "include-dirs", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Extra library directory, searched after the defaults (repeatable)
    #[arg(short = 'L', long = "library-dirs", value_name = "DIR")]
    pub library_dirs: Vec<PathBuf>,

    /// Directory for intermediate and built files
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct SdistArgs {
    /// Directory to write the archive to
    #[arg(short, long, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the dist directory
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Directory to scan (default: the source directory of each extension)
    pub dir: Option<PathBuf>,

    /// File suffix of binding sources
    #[arg(long, default_value = "pyx")]
    pub suffix: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
