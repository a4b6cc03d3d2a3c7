//! Path sandbox check
//!
//! Extension key and file path are request inputs in the original system,
//! so the check runs on every call and is never cached.

use std::path::{Component, Path, PathBuf};

use crate::scanner::ScanError;

/// Resolve `relative` inside `root`, rejecting anything that escapes the
/// root or is not a regular file
pub fn resolve_in_root(root: &Path, relative: &Path) -> Result<PathBuf, ScanError> {
    if relative.as_os_str().is_empty() || relative.is_absolute() {
        return Err(ScanError::PathNotAllowed(relative.to_path_buf()));
    }
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(ScanError::PathNotAllowed(relative.to_path_buf())),
        }
    }

    let candidate = root.join(relative);
    let canonical = candidate
        .canonicalize()
        .map_err(|_| ScanError::PathNotAllowed(candidate.clone()))?;
    let canonical_root = root
        .canonicalize()
        .map_err(|_| ScanError::PathNotAllowed(root.to_path_buf()))?;

    if !canonical.starts_with(&canonical_root) || !canonical.is_file() {
        return Err(ScanError::PathNotAllowed(candidate));
    }
    Ok(canonical)
}
