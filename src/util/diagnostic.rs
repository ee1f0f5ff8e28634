//! User-friendly diagnostic messages.
//!
//! Every fatal error is printed with its root cause, any context lines, and
//! suggested fixes when we know of one.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str =
        "Create a Flintext.toml in the project root or pass --manifest-path";

    /// Suggestion when Cython is not installed.
    pub const NO_CYTHON: &str =
        "Install Cython or set `toolchain.cython` in .flintext/config.toml";
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Error code, e.g. `flintext::build::link`
    pub code: Option<String>,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            code: None,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Attach an error code, shown in the `error[...]` header.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let header = match &self.code {
            Some(code) => format!("error[{}]", code),
            None => "error".to_string(),
        };
        if color {
            output.push_str(&format!("\x1b[1;31m{}\x1b[0m: {}\n", header, self.message));
        } else {
            output.push_str(&format!("{}: {}\n", header, self.message));
        }

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        // Toolchain output is kept verbatim, one context entry may span lines.
        for ctx in &self.context {
            for line in ctx.lines() {
                output.push_str(&format!("  | {}\n", line));
            }
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}: {}\n", help_prefix, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("failed to link extension `flint`")
            .with_context("/usr/bin/ld: cannot find -larb\ncollect2: error: ld returned 1 exit status")
            .with_suggestion("Make sure FLINT and Arb are installed");

        let output = diag.format(false);
        assert!(output.starts_with("error: failed to link extension `flint`"));
        assert!(output.contains("  | /usr/bin/ld: cannot find -larb\n"));
        assert!(output.contains("  | collect2: error"));
        assert!(output.contains("help: Make sure FLINT and Arb are installed"));
    }

    #[test]
    fn test_code_and_location() {
        let diag = Diagnostic::error("binding source `src/extra.pyx` does not exist")
            .with_code("flintext::build::missing_source")
            .with_location("src/extra.pyx");
        let output = diag.to_string();
        assert!(output.starts_with("error[flintext::build::missing_source]: binding source"));
        assert!(output.contains("--> src/extra.pyx"));
    }

    #[test]
    fn test_no_manifest_suggestion() {
        let output = Diagnostic::error("could not find `Flintext.toml`")
            .with_suggestion(suggestions::NO_MANIFEST)
            .format(false);
        assert!(output.starts_with("error: could not find"));
        assert!(output.ends_with("help: Create a Flintext.toml in the project root or pass --manifest-path\n"));
    }
}
