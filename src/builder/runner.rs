//! Running external tools.

use anyhow::Result;

use crate::builder::toolchain::CommandSpec;
use crate::util::process::ProcessBuilder;

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Diagnostic text of a failed command: stderr, or stdout when stderr is
    /// empty (MSVC prints its errors on stdout).
    pub fn diagnostic(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        text.trim_end().to_string()
    }
}

/// Executes [`CommandSpec`]s.
///
/// Spawn failures are errors; a command that runs and exits non-zero is a
/// normal [`CommandOutput`] with `success == false`.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands as real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let process = ProcessBuilder::new(&spec.program).args(&spec.args);

        tracing::debug!("Running `{}`", process.display_command());
        let output = process.exec()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "compiling\n".to_string(),
            stderr: "pyflint.c:3: error: expected ';'\n".to_string(),
        };
        assert_eq!(out.diagnostic(), "pyflint.c:3: error: expected ';'");
    }

    #[test]
    fn test_diagnostic_falls_back_to_stdout() {
        let out = CommandOutput {
            success: false,
            code: Some(2),
            stdout: "pyflint.c(3): error C2143: syntax error\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(out.diagnostic(), "pyflint.c(3): error C2143: syntax error");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_reports_exit_status() {
        let ok = ProcessRunner.run(&CommandSpec::new("true")).unwrap();
        assert!(ok.success);

        let failed = ProcessRunner.run(&CommandSpec::new("false")).unwrap();
        assert!(!failed.success);
    }
}
