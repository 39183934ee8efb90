//! Module search path for renderer processes
//!
//! The renderer runs with the unit's temp directory as its working
//! directory, so the search path must let it find the source file's
//! siblings and any user libraries from there: the source directory first,
//! then each user entry expressed relative to the unit directory.

use crate::domain::{Result, ScadexError};
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// Environment variable the renderer reads its library path from
pub const DEFAULT_SEARCH_PATH_VAR: &str = "OPENSCADPATH";

/// Builds the search path value for one unit
///
/// `user` is split with the platform's path-list convention; empty entries
/// are dropped. Relative entries are taken relative to `cwd`.
///
/// # Errors
///
/// Returns a configuration error if an entry cannot be represented in a
/// path list (for example it contains the list separator).
pub fn build_search_path(
    source_dir: &Path,
    user: Option<&OsStr>,
    unit_dir: &Path,
    cwd: &Path,
) -> Result<OsString> {
    let unit_dir = absolutize(unit_dir, cwd);
    let mut entries = vec![source_dir.to_path_buf()];

    if let Some(user) = user {
        entries.extend(
            std::env::split_paths(user)
                .filter(|entry| !entry.as_os_str().is_empty())
                .map(|entry| relative_to(&absolutize(&entry, cwd), &unit_dir)),
        );
    }

    std::env::join_paths(&entries)
        .map_err(|e| ScadexError::Configuration(format!("Invalid search path entry: {e}")))
}

/// Joins relative `path` onto `cwd`
pub(crate) fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Expresses absolute `path` relative to absolute `base`
///
/// Paths on different roots (e.g. different Windows drives) are returned
/// unchanged. `.` and `..` components are compared literally.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    if path_parts.first() != base_parts.first() {
        return path.to_path_buf();
    }

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/a/b/lib", "/a/b", "lib" ; "child")]
    #[test_case("/a/lib", "/a/b/c", "../../lib" ; "sibling of ancestor")]
    #[test_case("/a/b", "/a/b", "." ; "same directory")]
    #[test_case("/x/y", "/a/b", "../../x/y" ; "disjoint")]
    #[test_case("/", "/tmp", ".." ; "root")]
    fn test_relative_to(path: &str, base: &str, expected: &str) {
        assert_eq!(
            relative_to(Path::new(path), Path::new(base)),
            PathBuf::from(expected)
        );
    }

    #[test]
    fn test_source_dir_only() {
        let value =
            build_search_path(Path::new("/proj/cad"), None, Path::new("/tmp"), Path::new("/home/u"))
                .unwrap();
        assert_eq!(value, OsString::from("/proj/cad"));
    }

    #[test]
    fn test_user_entries_relative_to_unit_dir() {
        let user = OsString::from("libs:/opt/openscad/libraries");
        let value = build_search_path(
            Path::new("/proj/cad"),
            Some(&user),
            Path::new("/tmp"),
            Path::new("/home/u"),
        )
        .unwrap();
        assert_eq!(
            value,
            OsString::from("/proj/cad:../home/u/libs:../opt/openscad/libraries")
        );
    }

    #[test]
    fn test_empty_entries_are_dropped() {
        let user = OsString::from("::");
        let value =
            build_search_path(Path::new("/p"), Some(&user), Path::new("/tmp"), Path::new("/"))
                .unwrap();
        assert_eq!(value, OsString::from("/p"));
    }

    #[test]
    fn test_relative_unit_dir_is_resolved_against_cwd() {
        let user = OsString::from("/w/libs");
        let value =
            build_search_path(Path::new("/p"), Some(&user), Path::new("tmp"), Path::new("/w"))
                .unwrap();
        assert_eq!(value, OsString::from("/p:../libs"));
    }
}
