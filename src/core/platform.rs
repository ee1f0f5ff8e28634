//! Platform profiles: which native libraries an extension links on each
//! host operating system family.
//!
//! FLINT and Arb assume different multiprecision backends are already present
//! in the process depending on the OS. On Windows the MPIR/MPFR and pthreads
//! libraries must be linked explicitly; elsewhere the two core libraries are
//! enough.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::manifest::PlatformSection;

/// The two core numerical libraries every extension links.
pub const CORE_LIBRARIES: &[&str] = &["flint", "arb"];

/// Libraries Windows builds need on top of the core ones.
pub const WINDOWS_EXTRA_LIBRARIES: &[&str] = &["mpir", "mpfr", "pthreads"];

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformId {
    Windows,
    PosixLike,
}

impl PlatformId {
    /// Detect the platform this binary is running on.
    ///
    /// This is the only place the host platform is consulted; everything
    /// downstream receives the value as a parameter.
    pub fn host() -> Self {
        if cfg!(windows) {
            PlatformId::Windows
        } else {
            PlatformId::PosixLike
        }
    }

    /// All supported platform identifiers.
    pub fn all() -> [PlatformId; 2] {
        [PlatformId::Windows, PlatformId::PosixLike]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Windows => "windows",
            PlatformId::PosixLike => "posix-like",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformId::Windows)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" | "win64" | "nt" => Ok(PlatformId::Windows),
            "posix-like" | "posix" | "unix" | "linux" | "macos" | "darwin" | "freebsd" => {
                Ok(PlatformId::PosixLike)
            }
            other => Err(BuildError::config(format!("unknown platform `{}`", other))),
        }
    }
}

/// Lookup from platform to the ordered list of required native libraries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    core: Vec<String>,
    windows_extra: Vec<String>,
}

impl Default for PlatformProfile {
    fn default() -> Self {
        PlatformProfile {
            core: CORE_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            windows_extra: WINDOWS_EXTRA_LIBRARIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PlatformProfile {
    /// Create a profile from explicit library lists.
    ///
    /// The core list must be non-empty and the Windows extras must add at
    /// least one library not already in the core list, so the Windows set is
    /// always a strict superset of the non-Windows set.
    pub fn new(core: Vec<String>, windows_extra: Vec<String>) -> Result<Self, BuildError> {
        let core = dedup_names(core);
        if core.is_empty() {
            return Err(BuildError::config(
                "platform profile needs at least one core library",
            ));
        }

        let windows_extra: Vec<String> = dedup_names(windows_extra)
            .into_iter()
            .filter(|lib| !core.contains(lib))
            .collect();
        if windows_extra.is_empty() {
            return Err(BuildError::config(
                "the Windows library list must add libraries beyond the core set",
            ));
        }

        Ok(PlatformProfile {
            core,
            windows_extra,
        })
    }

    /// Build a profile from the manifest's `[platform]` table, falling back
    /// to the default lists for anything not given.
    pub fn from_section(section: &PlatformSection) -> Result<Self, BuildError> {
        let defaults = PlatformProfile::default();
        PlatformProfile::new(
            section.core.clone().unwrap_or(defaults.core),
            section.windows.clone().unwrap_or(defaults.windows_extra),
        )
    }

    /// Core libraries shared by every platform.
    pub fn core(&self) -> &[String] {
        &self.core
    }

    /// Libraries for the given platform, core libraries first.
    pub fn libraries(&self, platform: PlatformId) -> Vec<String> {
        let mut libs = self.core.clone();
        if platform.is_windows() {
            libs.extend(self.windows_extra.iter().cloned());
        }
        libs
    }
}

/// Resolve the ordered native libraries required on `platform`.
pub fn resolve_platform_libraries(profile: &PlatformProfile, platform: PlatformId) -> Vec<String> {
    profile.libraries(platform)
}

/// Append extension-specific libraries after the platform list, skipping
/// names already present.
pub fn with_extra_libraries(mut libraries: Vec<String>, extra: &[String]) -> Vec<String> {
    for lib in extra {
        if !libraries.contains(lib) {
            libraries.push(lib.clone());
        }
    }
    libraries
}

fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim().to_string();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_libraries() {
        let libs = resolve_platform_libraries(&PlatformProfile::default(), PlatformId::PosixLike);
        assert_eq!(libs, vec!["flint", "arb"]);
    }

    #[test]
    fn test_windows_libraries_in_declared_order() {
        let libs = resolve_platform_libraries(&PlatformProfile::default(), PlatformId::Windows);
        assert_eq!(libs, vec!["flint", "arb", "mpir", "mpfr", "pthreads"]);
    }

    #[test]
    fn test_every_platform_has_core_libraries() {
        let profile = PlatformProfile::default();
        for platform in PlatformId::all() {
            let libs = profile.libraries(platform);
            for core in CORE_LIBRARIES {
                assert!(libs.iter().any(|l| l == core), "{} missing on {}", core, platform);
            }
        }
    }

    #[test]
    fn test_windows_is_strict_superset() {
        let profile = PlatformProfile::default();
        let posix = profile.libraries(PlatformId::PosixLike);
        let windows = profile.libraries(PlatformId::Windows);

        assert!(posix.iter().all(|l| windows.contains(l)));
        assert!(windows.len() > posix.len());
    }

    #[test]
    fn test_profile_rejects_empty_windows_extras() {
        let err = PlatformProfile::new(
            vec!["flint".into(), "arb".into()],
            vec!["arb".into()],
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    fn test_profile_from_section_overrides_core() {
        let section = PlatformSection {
            core: Some(vec!["flint".into(), "arb".into(), "gmp".into()]),
            windows: None,
        };
        let profile = PlatformProfile::from_section(&section).unwrap();
        assert_eq!(profile.libraries(PlatformId::PosixLike), vec!["flint", "arb", "gmp"]);
        assert_eq!(profile.libraries(PlatformId::Windows).len(), 6);
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("windows".parse::<PlatformId>().unwrap(), PlatformId::Windows);
        assert_eq!("posix-like".parse::<PlatformId>().unwrap(), PlatformId::PosixLike);
        assert_eq!("Linux".parse::<PlatformId>().unwrap(), PlatformId::PosixLike);
        assert!("amiga".parse::<PlatformId>().is_err());
    }

    #[test]
    fn test_extra_libraries_appended_without_duplicates() {
        let libs = with_extra_libraries(
            vec!["flint".into(), "arb".into()],
            &["arb".into(), "m".into()],
        );
        assert_eq!(libs, vec!["flint", "arb", "m"]);
    }
}
