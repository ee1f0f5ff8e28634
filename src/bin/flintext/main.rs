//! flintext CLI - builds the FLINT/Arb binding module

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use flintext::util::context::ManifestError;
use flintext::util::diagnostic::{emit, suggestions, Diagnostic};
use flintext::BuildError;

fn main() {
    if let Err(e) = run() {
        report(&e);
        std::process::exit(1);
    }
}

fn report(e: &anyhow::Error) {
    let color = std::io::stderr().is_terminal();
    if let Some(build_error) = e.downcast_ref::<BuildError>() {
        emit(&build_error.to_diagnostic(), color);
    } else if let Some(manifest_error) = e.downcast_ref::<ManifestError>() {
        emit(
            &Diagnostic::error(manifest_error.to_string()).with_suggestion(suggestions::NO_MANIFEST),
            color,
        );
    } else {
        eprintln!("error: {:#}", e);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("flintext=debug")
    } else {
        EnvFilter::new("flintext=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let manifest_path = cli.manifest_path.as_deref();
    match cli.command {
        Commands::BuildExt(args) => commands::build_ext::execute(args, manifest_path),
        Commands::Install(args) => commands::install::execute(args, manifest_path),
        Commands::Sdist(args) => commands::sdist::execute(args, manifest_path),
        Commands::Clean(args) => commands::clean::execute(args, manifest_path),
        Commands::Describe => commands::describe::execute(manifest_path),
        Commands::Discover(args) => commands::discover::execute(args, manifest_path),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
