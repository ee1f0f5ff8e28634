//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::platform::PlatformId;
use crate::util::config::ToolchainSettings;
use crate::util::process::{find_any_executable, find_executable, ProcessBuilder};

use super::{GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};

/// Detect the available toolchain.
///
/// Tries to find a C compiler with the following priority:
/// 1. `toolchain.cc` from the merged configuration
/// 2. On Windows: cl.exe and link.exe from PATH (a developer prompt)
/// 3. cc/gcc/clang from PATH
pub fn detect_toolchain(
    settings: &ToolchainSettings,
    platform: PlatformId,
) -> Result<Box<dyn Toolchain>> {
    if let Some(cc) = &settings.cc {
        match find_executable(cc) {
            Some(path) => {
                tracing::info!("Using C compiler from config: {}", path.display());
                return Ok(from_compiler(path));
            }
            None => tracing::warn!("Configured C compiler not found: {}", cc.display()),
        }
    }

    if platform.is_windows() {
        if let (Some(cl), Some(link)) = (find_executable("cl"), find_executable("link")) {
            tracing::debug!("Using MSVC: {}", cl.display());
            return Ok(Box::new(MsvcToolchain::new(cl, link)));
        }
    }

    if let Some(cc) = find_any_executable(&["cc", "gcc", "clang"]) {
        tracing::debug!("Using C compiler: {}", cc.display());
        return Ok(from_compiler(cc));
    }

    bail!(
        "no C compiler found\n\
         \n\
         flintext requires a C compiler (gcc, clang, or cl).\n\
         Set `toolchain.cc` in .flintext/config.toml or install a compiler."
    )
}

/// A toolchain assembled from conventional program names, without checking
/// they exist. Used when only printing a build plan.
pub fn fallback_toolchain(settings: &ToolchainSettings, platform: PlatformId) -> Box<dyn Toolchain> {
    match (&settings.cc, platform) {
        (Some(cc), _) => {
            let family = family_from_path(cc).unwrap_or(ToolchainPlatform::Gcc);
            toolchain_for(cc.clone(), family)
        }
        (None, PlatformId::Windows) => Box::new(MsvcToolchain::new(
            PathBuf::from("cl.exe"),
            PathBuf::from("link.exe"),
        )),
        (None, PlatformId::PosixLike) => {
            Box::new(GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc))
        }
    }
}

fn from_compiler(cc: PathBuf) -> Box<dyn Toolchain> {
    let family = detect_compiler_family(&cc);
    toolchain_for(cc, family)
}

fn toolchain_for(cc: PathBuf, family: ToolchainPlatform) -> Box<dyn Toolchain> {
    match family {
        ToolchainPlatform::Msvc => {
            let link = cc.with_file_name("link.exe");
            Box::new(MsvcToolchain::new(cc, link))
        }
        family => Box::new(GccToolchain::new(cc, family)),
    }
}

/// Guess the compiler family from the binary name alone.
pub fn family_from_path(cc: &Path) -> Option<ToolchainPlatform> {
    let name = cc
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name == "cl" || name == "clang-cl" {
        Some(ToolchainPlatform::Msvc)
    } else if name.contains("clang") {
        Some(ToolchainPlatform::Clang)
    } else if name.contains("gcc") {
        Some(ToolchainPlatform::Gcc)
    } else {
        None
    }
}

/// Detect the compiler family, asking the compiler itself when the name is
/// not conclusive (`cc` is Apple Clang on macOS).
fn detect_compiler_family(cc: &Path) -> ToolchainPlatform {
    match family_from_path(cc) {
        Some(ToolchainPlatform::Gcc) => return ToolchainPlatform::Gcc,
        Some(ToolchainPlatform::Msvc) => return ToolchainPlatform::Msvc,
        _ => {}
    }

    let version = ProcessBuilder::new(cc)
        .arg("--version")
        .exec()
        .map(|out| String::from_utf8_lossy(&out.stdout).to_lowercase())
        .unwrap_or_default();

    family_from_version_output(&version)
}

fn family_from_version_output(version: &str) -> ToolchainPlatform {
    if version.contains("apple") && version.contains("clang") {
        ToolchainPlatform::AppleClang
    } else if version.contains("clang") {
        ToolchainPlatform::Clang
    } else {
        ToolchainPlatform::Gcc
    }
}
