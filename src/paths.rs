//! Conversions between the portable path strings written to saved workflow
//! state and the native paths used on this host.
//!
//! Saved values always use `/` and are relative to the workflow root where
//! possible, so a workflow directory can be moved or shared between machines.

use std::path::{Component, MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, PathBuf};

pub const PORTABLE_SEPARATOR: char = '/';

/// Rewrites native separators to the portable `/`.
pub fn to_portable(path: &str) -> String {
    if MAIN_SEPARATOR == PORTABLE_SEPARATOR {
        path.to_owned()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}

/// Rewrites portable `/` separators to the host separator.
pub fn to_native(path: &str) -> String {
    if MAIN_SEPARATOR == PORTABLE_SEPARATOR {
        path.to_owned()
    } else {
        path.replace(PORTABLE_SEPARATOR, MAIN_SEPARATOR_STR)
    }
}

/// Lexically removes `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Absolute, normalized form of `path`, anchored at the current directory
/// when relative.
pub fn absolute(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(absolute) => normalize(&absolute),
        Err(_) => normalize(path),
    }
}

/// Path of `path` relative to `base`. Paths on different roots (drive
/// prefixes) have no relative form and are returned absolute.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = absolute(path);
    let base = absolute(base);
    if path.components().next() != base.components().next() {
        return path;
    }

    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();
    while let (Some(left), Some(right)) = (path_components.peek(), base_components.peek()) {
        if left != right {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut relative = PathBuf::new();
    for _ in base_components {
        relative.push("..");
    }
    for component in path_components {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// Resolves a saved (portable, possibly relative) value against `base`.
pub fn resolve(base: &Path, value: &str) -> PathBuf {
    absolute(&base.join(to_native(value)))
}
