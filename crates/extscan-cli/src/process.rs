//! File collection and per-file scanning

use std::path::{Path, PathBuf};

use extscan_scanner::{ScanError, ScanResult, Scanner};

/// Outcome of scanning one file, kept I/O-free for parallel execution
pub enum FileOutcome {
    Scanned(ScanResult),
    Syntax(String),
    Error(String),
}

/// Expand the given paths into individual `.php` files
///
/// Returns the files to scan and any paths that do not exist.
pub fn collect_php_files(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut missing = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            missing.push(path.clone());
        }
    }
    (files, missing)
}

/// Scan one file, mapping errors into a reportable outcome
pub fn scan_to_outcome(
    scanner: &Scanner,
    extension_root: Option<&Path>,
    path: &Path,
) -> FileOutcome {
    let result = match extension_root {
        Some(root) => scanner.scan_extension_file(root, path),
        None => scanner.scan_file(path),
    };
    match result {
        Ok(result) => FileOutcome::Scanned(result),
        Err(ScanError::Syntax(message)) => FileOutcome::Syntax(message),
        Err(error) => FileOutcome::Error(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_php_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Classes")).unwrap();
        fs::write(dir.path().join("Classes/A.php"), "<?php\n").unwrap();
        fs::write(dir.path().join("Classes/B.php"), "<?php\n").unwrap();
        fs::write(dir.path().join("readme.txt"), "not php").unwrap();

        let (files, missing) = collect_php_files(&[dir.path().to_path_buf()]);
        assert_eq!(files.len(), 2);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_missing_path_is_reported() {
        let (files, missing) = collect_php_files(&[PathBuf::from("/no/such/path")]);
        assert!(files.is_empty());
        assert_eq!(missing.len(), 1);
    }
}
