//! Build error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// A fatal error raised by the build pipeline.
///
/// None of these are recovered locally; they abort the build and are
/// surfaced to the user with the toolchain's diagnostic text intact.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("binding source `{}` does not exist", path.display())]
    #[diagnostic(
        code(flintext::build::missing_source),
        help("Check the `sources` list of the extension in Flintext.toml")
    )]
    MissingSource { path: PathBuf },

    #[error("{tool} failed on `{}`\n{diagnostic}", source_path.display())]
    #[diagnostic(
        code(flintext::build::compile),
        help("Run `flintext --verbose build_ext` for more details")
    )]
    Compile {
        source_path: PathBuf,
        tool: String,
        diagnostic: String,
    },

    #[error("failed to link extension `{target}`\n{diagnostic}")]
    #[diagnostic(
        code(flintext::build::link),
        help("Make sure FLINT and Arb are installed, or pass --library-dirs")
    )]
    Link { target: String, diagnostic: String },

    #[error("invalid package metadata: `{field}` {reason}")]
    #[diagnostic(
        code(flintext::metadata),
        help("Fill in the [package] table of Flintext.toml")
    )]
    Metadata { field: String, reason: String },

    #[error("extension `{name}` has no sources to build")]
    #[diagnostic(code(flintext::build::empty_extension))]
    EmptyExtension { name: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(flintext::config))]
    Config { message: String },
}

impl BuildError {
    /// Shorthand for a metadata error.
    pub fn metadata(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BuildError::Metadata {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        BuildError::Config {
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic, carrying the error code and
    /// help text declared on the variant.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = match self {
            BuildError::MissingSource { path } => {
                Diagnostic::error(self.to_string()).with_location(path.clone())
            }
            BuildError::Compile {
                source_path,
                tool,
                diagnostic,
            } => Diagnostic::error(format!("{} failed on `{}`", tool, source_path.display()))
                .with_location(source_path.clone())
                .with_context(diagnostic.clone()),
            BuildError::Link { target, diagnostic } => {
                Diagnostic::error(format!("failed to link extension `{}`", target))
                    .with_context(diagnostic.clone())
            }
            BuildError::Metadata { .. }
            | BuildError::EmptyExtension { .. }
            | BuildError::Config { .. } => Diagnostic::error(self.to_string()),
        };

        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }
        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }
        diag
    }
}
