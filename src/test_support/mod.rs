//! Test utilities and mocks for flintext unit tests.
//!
//! [`MockRunner`] stands in for Cython, the C compiler and the interpreter
//! probe so the whole pipeline can run without any of them installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use flintext::test_support::{mock_context, MockRunner};
//!
//! #[test]
//! fn test_example() {
//!     let runner = MockRunner::new().with_failure("-larb", "cannot find -larb");
//!     let ctx = mock_context(tmp.path(), &runner);
//!
//!     // Run the pipeline against ctx, then inspect runner.calls()...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;

pub use fixtures::*;

use crate::builder::context::BuildContext;
use crate::builder::runner::{CommandOutput, CommandRunner};
use crate::builder::toolchain::{CommandSpec, GccToolchain, ToolchainPlatform};
use crate::builder::translate::CythonTranslator;
use crate::core::platform::PlatformId;

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    output: CommandOutput,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<CommandSpec>,
    rules: Vec<Rule>,
}

/// Command runner that records commands instead of spawning them.
///
/// Commands succeed by default, and the file named by `-o`, `/Fo` or `/OUT:`
/// is created so later passes find their inputs. A rule registered with
/// [`with_failure`](Self::with_failure) or [`with_stdout`](Self::with_stdout)
/// applies to every command whose rendered text contains its pattern; the
/// first matching rule wins. Clones share their recorded calls.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Fail commands matching `pattern` with `stderr`.
    pub fn with_failure(self, pattern: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.push_rule(
            pattern,
            CommandOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: stderr.into(),
            },
        )
    }

    /// Answer commands matching `pattern` with `stdout`.
    pub fn with_stdout(self, pattern: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.push_rule(
            pattern,
            CommandOutput {
                success: true,
                code: Some(0),
                stdout: stdout.into(),
                stderr: String::new(),
            },
        )
    }

    fn push_rule(self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        self.state.lock().unwrap().rules.push(Rule {
            pattern: pattern.into(),
            output,
        });
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Programs run so far, by short name.
    pub fn tools(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.tool_name()).collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(spec.clone());

        let rendered = spec.to_string();
        let matched = state
            .rules
            .iter()
            .find(|rule| rendered.contains(&rule.pattern))
            .map(|rule| rule.output.clone());

        let output = matched.unwrap_or(CommandOutput {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        });

        if output.success {
            if let Some(path) = output_path(spec) {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, format!("mock output of {}\n", spec.tool_name()))?;
            }
        }

        Ok(output)
    }
}

/// The file a command writes, if it names one.
fn output_path(spec: &CommandSpec) -> Option<PathBuf> {
    let mut args = spec.args.iter();
    while let Some(arg) = args.next() {
        if arg == "-o" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("/Fo").or_else(|| arg.strip_prefix("/OUT:")) {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// A POSIX-like build context writing under `build_dir` and running every
/// command through `runner`.
pub fn mock_context(build_dir: &Path, runner: &MockRunner) -> BuildContext {
    mock_context_for(PlatformId::PosixLike, build_dir, runner)
}

/// Like [`mock_context`] for an explicit platform.
pub fn mock_context_for(platform: PlatformId, build_dir: &Path, runner: &MockRunner) -> BuildContext {
    BuildContext::new(
        platform,
        build_dir.to_path_buf(),
        Box::new(GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc)),
        CythonTranslator::new("cython"),
        Box::new(runner.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_runner_creates_outputs() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("temp").join("pyflint.o");
        let runner = MockRunner::new();

        let result = runner
            .run(&CommandSpec::new("cc").arg("-c").arg("pyflint.c").arg("-o").arg(out.display().to_string()))
            .unwrap();
        assert!(result.success);
        assert!(out.is_file());
        assert_eq!(runner.tools(), vec!["cc"]);
    }

    #[test]
    fn test_mock_runner_failure_rule() {
        let runner = MockRunner::new().with_failure("pyflint", "boom");
        let shared = runner.clone();

        let result = runner.run(&CommandSpec::new("cython").arg("pyflint.pyx")).unwrap();
        assert!(!result.success);
        assert_eq!(result.stderr, "boom");
        assert_eq!(shared.calls().len(), 1);
    }
}
