//! Match data model shared by matchers and the scan pipeline

use serde::Serialize;

/// Confidence of a match
///
/// A `Strong` hit means the scanned code referenced the configured symbol by
/// its fully qualified identity. A `Weak` hit matched by member name only,
/// since the receiver type of `$foo->bar()` is unknown without whole-project
/// type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Strong,
    Weak,
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Indicator::Strong => write!(f, "strong"),
            Indicator::Weak => write!(f, "weak"),
        }
    }
}

/// One detected occurrence of a configured symbol in a scanned file
///
/// Matchers fill in message, line, indicator and the changelog filenames;
/// the aggregation step assigns the unique id, re-reads the line content and
/// resolves the changelog references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    /// Identifier unique within one scan result, assigned during aggregation
    pub unique_id: String,
    /// Human-readable description of the finding
    pub message: String,
    /// 1-based source line
    pub line: usize,
    pub indicator: Indicator,
    /// Trimmed literal text of the source line, re-read from disk post-hoc
    pub line_content: String,
    /// Changelog document filenames configured for the matched rule(s)
    pub changelog_refs: Vec<String>,
    /// Resolved changelog documents
    pub changelog_entries: Vec<ChangelogEntry>,
    /// References that failed resolution (missing or ambiguous); the hit
    /// itself survives
    pub unresolved_refs: Vec<String>,
}

impl Hit {
    /// Create a hit as emitted by a matcher, before aggregation
    pub fn new(
        message: impl Into<String>,
        line: usize,
        indicator: Indicator,
        changelog_refs: Vec<String>,
    ) -> Self {
        Self {
            unique_id: String::new(),
            message: message.into(),
            line,
            indicator,
            line_content: String::new(),
            changelog_refs,
            changelog_entries: Vec::new(),
            unresolved_refs: Vec::new(),
        }
    }
}

/// Metadata describing one changelog document, read fresh on every reference
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    /// Identifier unique per reference, so duplicate attachments stay distinct
    pub unique_id: String,
    /// Document filename (lookup key)
    pub filename: String,
    /// Underlined title of the document, empty if none was found
    pub headline: String,
    /// Hash of the document body, used by callers for "not affected" tracking
    pub content_hash: String,
    /// Free-text labels from the document index line, e.g. "FullyScanned"
    pub tags: Vec<String>,
    /// Directory-derived target version, e.g. "9.5" or "master"
    pub version: String,
}

/// Append `refs` to `target`, skipping filenames already present
///
/// Weak matchers merge several candidate rules into one hit; a changelog
/// document linked by more than one candidate must appear only once.
pub fn merge_changelog_refs(target: &mut Vec<String>, refs: &[String]) {
    for r in refs {
        if !target.iter().any(|existing| existing == r) {
            target.push(r.clone());
        }
    }
}
