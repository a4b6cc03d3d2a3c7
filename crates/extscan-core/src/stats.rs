//! Code line statistics and scan opt-out markers
//!
//! Classifies every source line as effective code or ignored (blank,
//! comment-only, or carrying an ignore marker) and detects the whole-file
//! opt-out marker. The counts are informational; the per-line ignore set
//! additionally suppresses matcher hits on marked lines.

use std::collections::HashSet;

/// Suppresses every hit on the line carrying it
pub const IGNORE_LINE_MARKER: &str = "@extscan-ignore-line";
/// Opts the whole file out of scanning
pub const IGNORE_FILE_MARKER: &str = "@extscan-ignore-file";

/// Line accounting for one source file
#[derive(Debug, Clone)]
pub struct CodeStatistics {
    pub is_file_ignored: bool,
    pub effective_code_lines: usize,
    pub ignored_lines: usize,
    marked_lines: HashSet<usize>,
}

impl CodeStatistics {
    /// Classify all lines of `source`
    pub fn analyze(source: &str) -> Self {
        let mut effective = 0;
        let mut ignored = 0;
        let mut total = 0;
        let mut marked_lines = HashSet::new();
        let mut file_ignored = false;
        let mut in_block_comment = false;

        for (idx, line) in source.lines().enumerate() {
            let line_number = idx + 1;
            total += 1;

            if line.contains(IGNORE_FILE_MARKER) {
                file_ignored = true;
            }
            if line.contains(IGNORE_LINE_MARKER) {
                marked_lines.insert(line_number);
                ignored += 1;
                continue;
            }

            let trimmed = line.trim();

            if in_block_comment {
                ignored += 1;
                if let Some(close) = trimmed.find("*/") {
                    in_block_comment = false;
                    // Code after the comment close still counts
                    if !trimmed[close + 2..].trim().is_empty() {
                        ignored -= 1;
                        effective += 1;
                    }
                }
                continue;
            }

            if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
                ignored += 1;
                continue;
            }

            if let Some(open) = trimmed.find("/*") {
                let before = trimmed[..open].trim();
                let after_open = &trimmed[open + 2..];
                if !after_open.contains("*/") {
                    in_block_comment = true;
                }
                if before.is_empty()
                    && after_open
                        .rfind("*/")
                        .map(|close| after_open[close + 2..].trim().is_empty())
                        .unwrap_or(true)
                {
                    ignored += 1;
                    continue;
                }
            }

            effective += 1;
        }

        if file_ignored {
            Self {
                is_file_ignored: true,
                effective_code_lines: 0,
                ignored_lines: total,
                marked_lines,
            }
        } else {
            Self {
                is_file_ignored: false,
                effective_code_lines: effective,
                ignored_lines: ignored,
                marked_lines,
            }
        }
    }

    /// Whether hits reported for `line` must be suppressed
    pub fn is_line_ignored(&self, line: usize) -> bool {
        self.is_file_ignored || self.marked_lines.contains(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_effective_and_ignored_lines() {
        let source = "<?php\n\n// comment\n$a = 1;\n$b = 2;\n";
        let stats = CodeStatistics::analyze(source);
        assert!(!stats.is_file_ignored);
        assert_eq!(stats.effective_code_lines, 3); // <?php + two assignments
        assert_eq!(stats.ignored_lines, 2); // blank + line comment
    }

    #[test]
    fn test_block_comments_are_ignored() {
        let source = "<?php\n/*\n * docs\n */\n$a = 1;\n";
        let stats = CodeStatistics::analyze(source);
        assert_eq!(stats.effective_code_lines, 2);
        assert_eq!(stats.ignored_lines, 3);
    }

    #[test]
    fn test_ignore_line_marker_suppresses_line() {
        let source = "<?php\n$a = legacyCall(); // @extscan-ignore-line\n$b = 2;\n";
        let stats = CodeStatistics::analyze(source);
        assert!(stats.is_line_ignored(2));
        assert!(!stats.is_line_ignored(3));
        assert_eq!(stats.ignored_lines, 1);
        assert_eq!(stats.effective_code_lines, 2);
    }

    #[test]
    fn test_ignore_file_marker() {
        let source = "<?php\n// @extscan-ignore-file\n$a = 1;\n$b = 2;\n";
        let stats = CodeStatistics::analyze(source);
        assert!(stats.is_file_ignored);
        assert_eq!(stats.effective_code_lines, 0);
        assert_eq!(stats.ignored_lines, 4);
        assert!(stats.is_line_ignored(3));
    }

    #[test]
    fn test_code_after_block_comment_close_counts() {
        let source = "<?php\n/* note\n */ $a = 1;\n";
        let stats = CodeStatistics::analyze(source);
        assert_eq!(stats.effective_code_lines, 2);
        assert_eq!(stats.ignored_lines, 1);
    }
}
