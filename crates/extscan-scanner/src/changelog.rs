//! Changelog document resolution
//!
//! Hits reference changelog documents by filename only. A document must
//! match exactly one file under the documentation root, excluding legacy
//! version subtrees; zero or several matches are a configuration defect and
//! reported as such. Parsed metadata is cached for the lifetime of one
//! resolver, i.e. one scan session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use extscan_core::ChangelogEntry;
use thiserror::Error;
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("changelog document \"{0}\" matches {1} files under the documentation root")]
    NotFoundOrAmbiguous(String, usize),

    #[error("failed to read changelog document: {0}")]
    Io(#[from] std::io::Error),
}

/// Filename-based lookup over a changelog documentation root
pub struct ChangelogResolver {
    root: PathBuf,
    cache: HashMap<String, ChangelogEntry>,
}

impl ChangelogResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// Resolve one referenced filename to its parsed document metadata
    ///
    /// The returned entry has an empty unique id; the aggregation step
    /// assigns one per reference.
    pub fn resolve(&mut self, filename: &str) -> Result<ChangelogEntry, ChangelogError> {
        if let Some(entry) = self.cache.get(filename) {
            return Ok(entry.clone());
        }

        let mut matches: Vec<PathBuf> = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            // Legacy version subtrees (8.x) are not scanned against
            .filter_entry(|e| {
                e.depth() != 1
                    || !e.file_type().is_dir()
                    || !e.file_name().to_string_lossy().starts_with('8')
            });
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && entry.file_name().to_string_lossy() == filename {
                matches.push(entry.into_path());
            }
        }
        if matches.len() != 1 {
            return Err(ChangelogError::NotFoundOrAmbiguous(
                filename.to_string(),
                matches.len(),
            ));
        }

        let path = &matches[0];
        let content = fs::read_to_string(path)?;
        let entry = parse_document(filename, path, &content);
        self.cache.insert(filename.to_string(), entry.clone());
        Ok(entry)
    }
}

/// Extract headline, tags, content hash and directory-derived version
fn parse_document(filename: &str, path: &Path, content: &str) -> ChangelogEntry {
    let lines: Vec<&str> = content.lines().collect();

    let mut headline = String::new();
    for window in lines.windows(2) {
        let (line, underline) = (window[0].trim(), window[1].trim());
        if !line.is_empty()
            && !line.chars().all(|c| c == '=')
            && underline.len() >= 4
            && underline.chars().all(|c| c == '=')
        {
            headline = line.to_string();
            break;
        }
    }

    let mut tags = Vec::new();
    for line in &lines {
        if let Some(rest) = line.trim().strip_prefix(".. index::") {
            for tag in rest.split(',') {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.push(tag.to_string());
                }
            }
            break;
        }
    }

    let version = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    ChangelogEntry {
        unique_id: String::new(),
        filename: filename.to_string(),
        headline,
        content_hash: format!("{:016x}", xxh3_64(content.as_bytes())),
        tags,
        version,
    }
}
