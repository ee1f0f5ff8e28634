//! Probing the host interpreter the extension module is built for.
//!
//! The interpreter knows where its own headers live, which file suffix it
//! expects on extension modules, and where platform-specific packages are
//! installed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::runner::CommandRunner;
use crate::builder::toolchain::CommandSpec;
use crate::core::platform::PlatformId;
use crate::util::config::ToolchainSettings;
use crate::util::process::find_any_executable;

const PROBE_SCRIPT: &str = "import json, sysconfig; \
p = sysconfig.get_paths(); \
print(json.dumps({'include_dir': p['include'], 'platlib': p['platlib'], \
'ext_suffix': sysconfig.get_config_var('EXT_SUFFIX') or ''}))";

/// What the host interpreter reported about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterInfo {
    /// Directory containing the interpreter's C headers
    pub include_dir: PathBuf,
    /// Directory platform-specific modules are installed into
    pub platlib: PathBuf,
    /// Extension module suffix (e.g. `.cpython-312-x86_64-linux-gnu.so`)
    pub ext_suffix: String,
}

/// Fallback module suffix when no interpreter could be probed.
pub fn default_ext_suffix(platform: PlatformId) -> &'static str {
    match platform {
        PlatformId::Windows => ".pyd",
        PlatformId::PosixLike => ".so",
    }
}

/// The interpreter to probe: config, else `python3`/`python` from PATH.
pub fn find_interpreter(settings: &ToolchainSettings) -> Option<PathBuf> {
    settings
        .python
        .clone()
        .or_else(|| find_any_executable(&["python3", "python"]))
}

/// Ask `python` for its include directory, install directory and module
/// suffix.
pub fn probe(python: &Path, runner: &dyn CommandRunner) -> Result<InterpreterInfo> {
    let cmd = CommandSpec::new(python).arg("-c").arg(PROBE_SCRIPT);
    let output = runner.run(&cmd)?;
    if !output.success {
        bail!(
            "interpreter probe `{}` failed\n{}",
            python.display(),
            output.diagnostic()
        );
    }
    parse_probe_output(&output.stdout)
}

/// Probe, logging and swallowing failures. The build proceeds with system
/// defaults when no interpreter is available.
pub fn probe_or_warn(settings: &ToolchainSettings, runner: &dyn CommandRunner) -> Option<InterpreterInfo> {
    let python = find_interpreter(settings)?;
    match probe(&python, runner) {
        Ok(info) => {
            tracing::debug!(
                "interpreter {}: include {}, suffix {}",
                python.display(),
                info.include_dir.display(),
                info.ext_suffix
            );
            Some(info)
        }
        Err(e) => {
            tracing::warn!("could not probe interpreter: {:#}", e);
            None
        }
    }
}

/// Parse the JSON line printed by the probe script.
pub fn parse_probe_output(stdout: &str) -> Result<InterpreterInfo> {
    let line = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .context("interpreter probe printed nothing")?;
    serde_json::from_str(line.trim()).context("interpreter probe printed malformed JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;

    const PROBE_JSON: &str = r#"{"include_dir": "/usr/include/python3.12", "platlib": "/usr/lib/python3/dist-packages", "ext_suffix": ".cpython-312-x86_64-linux-gnu.so"}"#;

    #[test]
    fn test_parse_probe_output() {
        let info = parse_probe_output(&format!("{}\n", PROBE_JSON)).unwrap();
        assert_eq!(info.include_dir, PathBuf::from("/usr/include/python3.12"));
        assert_eq!(info.ext_suffix, ".cpython-312-x86_64-linux-gnu.so");
    }

    #[test]
    fn test_parse_probe_output_rejects_garbage() {
        assert!(parse_probe_output("").is_err());
        assert!(parse_probe_output("Traceback (most recent call last):").is_err());
    }

    #[test]
    fn test_probe_through_runner() {
        let runner = MockRunner::new().with_stdout("sysconfig", PROBE_JSON);
        let info = probe(Path::new("python3"), &runner).unwrap();
        assert_eq!(info.platlib, PathBuf::from("/usr/lib/python3/dist-packages"));
        assert_eq!(runner.calls()[0].program, PathBuf::from("python3"));
    }

    #[test]
    fn test_probe_failure() {
        let runner = MockRunner::new().with_failure("sysconfig", "No module named sysconfig");
        let err = probe(Path::new("python3"), &runner).unwrap_err();
        assert!(format!("{:#}", err).contains("No module named sysconfig"));
    }

    #[test]
    fn test_default_ext_suffix() {
        assert_eq!(default_ext_suffix(PlatformId::Windows), ".pyd");
        assert_eq!(default_ext_suffix(PlatformId::PosixLike), ".so");
    }
}
