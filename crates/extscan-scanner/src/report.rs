//! Aggregate scan output for one file

use extscan_core::Hit;
use serde::Serialize;

/// Result of scanning one source file
///
/// Hits are ordered by matcher-registration order, then traversal order
/// within a matcher. Line counts are informational and do not affect which
/// matchers ran.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub hits: Vec<Hit>,
    pub is_file_ignored: bool,
    pub effective_code_lines: usize,
    pub ignored_lines: usize,
}

impl ScanResult {
    /// Whether the scan found anything actionable
    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }
}
