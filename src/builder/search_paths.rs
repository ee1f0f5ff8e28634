//! Include and library search path resolution.

use std::path::PathBuf;

use crate::builder::interpreter::InterpreterInfo;
use crate::core::platform::PlatformId;

const POSIX_INCLUDE_DIRS: &[&str] = &["/usr/include", "/usr/local/include"];

/// Combine default and extra search directories.
///
/// Defaults come first and extras are appended, so a system header always
/// wins over a same-named project header. Duplicates are dropped keeping the
/// first occurrence; nothing else is removed.
pub fn resolve_search_paths(defaults: &[PathBuf], extras: &[PathBuf]) -> Vec<PathBuf> {
    let mut resolved: Vec<PathBuf> = Vec::with_capacity(defaults.len() + extras.len());
    for path in defaults.iter().chain(extras) {
        if !resolved.contains(path) {
            resolved.push(path.clone());
        }
    }
    resolved
}

/// Default include directories: the interpreter's headers, then the
/// conventional system locations on POSIX-like hosts.
pub fn system_include_dirs(
    platform: PlatformId,
    interpreter: Option<&InterpreterInfo>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(info) = interpreter {
        dirs.push(info.include_dir.clone());
    }
    if !platform.is_windows() {
        dirs.extend(POSIX_INCLUDE_DIRS.iter().map(PathBuf::from));
    }
    dirs
}

/// Default library directories. The linker already searches the system
/// locations, and on Windows the interpreter's `libs` directory holds the
/// import library extension modules link against.
pub fn system_library_dirs(
    platform: PlatformId,
    interpreter: Option<&InterpreterInfo>,
) -> Vec<PathBuf> {
    match (platform, interpreter) {
        (PlatformId::Windows, Some(info)) => info
            .include_dir
            .parent()
            .map(|prefix| vec![prefix.join("libs")])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_first_extras_appended() {
        let resolved = resolve_search_paths(&[PathBuf::from("/usr/include")], &[PathBuf::from("src")]);
        assert_eq!(resolved, vec![PathBuf::from("/usr/include"), PathBuf::from("src")]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let resolved = resolve_search_paths(
            &[PathBuf::from("/usr/include"), PathBuf::from("src")],
            &[PathBuf::from("src"), PathBuf::from("/opt/flint/include"), PathBuf::from("/usr/include")],
        );
        assert_eq!(
            resolved,
            vec![
                PathBuf::from("/usr/include"),
                PathBuf::from("src"),
                PathBuf::from("/opt/flint/include"),
            ]
        );
    }

    #[test]
    fn test_system_include_dirs() {
        let info = InterpreterInfo {
            include_dir: PathBuf::from("/usr/include/python3.12"),
            platlib: PathBuf::from("/usr/lib/python3/dist-packages"),
            ext_suffix: ".so".to_string(),
        };
        assert_eq!(
            system_include_dirs(PlatformId::PosixLike, Some(&info)),
            vec![
                PathBuf::from("/usr/include/python3.12"),
                PathBuf::from("/usr/include"),
                PathBuf::from("/usr/local/include"),
            ]
        );
        assert!(system_include_dirs(PlatformId::Windows, None).is_empty());
    }

    #[test]
    fn test_windows_library_dirs_from_interpreter() {
        let info = InterpreterInfo {
            include_dir: PathBuf::from("C:/Python312/include"),
            platlib: PathBuf::from("C:/Python312/Lib/site-packages"),
            ext_suffix: ".cp312-win_amd64.pyd".to_string(),
        };
        assert_eq!(
            system_library_dirs(PlatformId::Windows, Some(&info)),
            vec![PathBuf::from("C:/Python312/libs")]
        );
        assert!(system_library_dirs(PlatformId::PosixLike, Some(&info)).is_empty());
    }
}
