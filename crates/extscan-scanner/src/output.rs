//! Scan result serialization

use crate::report::ScanResult;

/// Pretty JSON rendering of one scan result
pub fn to_json(result: &ScanResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Plain text rendering, one line per hit plus a statistics footer
pub fn to_text(result: &ScanResult) -> String {
    let mut out = String::new();

    if result.is_file_ignored {
        out.push_str("file opted out of scanning\n");
    }
    for hit in &result.hits {
        let refs = if hit.changelog_entries.is_empty() {
            hit.changelog_refs.join(", ")
        } else {
            hit.changelog_entries
                .iter()
                .map(|e| format!("{} ({})", e.filename, e.version))
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!(
            "line {:>4} [{}] {} -- {}\n",
            hit.line, hit.indicator, hit.message, refs
        ));
        if !hit.line_content.is_empty() {
            out.push_str(&format!("          {}\n", hit.line_content));
        }
        for unresolved in &hit.unresolved_refs {
            out.push_str(&format!("          unresolved reference: {}\n", unresolved));
        }
    }
    out.push_str(&format!(
        "{} hit(s), {} effective code line(s), {} ignored line(s)\n",
        result.hits.len(),
        result.effective_code_lines,
        result.ignored_lines
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use extscan_core::{Hit, Indicator};

    fn sample_result() -> ScanResult {
        let mut hit = Hit::new(
            "Use of class Cms\\Core\\Cache\\CacheFactory",
            12,
            Indicator::Strong,
            vec!["Breaking-90130-CacheFactoryRemoved.rst".to_string()],
        );
        hit.unique_id = "hit-1".to_string();
        hit.line_content = "$f = new CacheFactory();".to_string();
        ScanResult {
            hits: vec![hit],
            is_file_ignored: false,
            effective_code_lines: 40,
            ignored_lines: 8,
        }
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = to_json(&sample_result()).unwrap();
        assert!(json.contains("\"effectiveCodeLines\": 40"));
        assert!(json.contains("\"lineContent\""));
        assert!(json.contains("\"indicator\": \"strong\""));
    }

    #[test]
    fn test_text_lists_hits_and_counts() {
        let text = to_text(&sample_result());
        assert!(text.contains("line   12 [strong]"));
        assert!(text.contains("Breaking-90130-CacheFactoryRemoved.rst"));
        assert!(text.contains("1 hit(s), 40 effective code line(s), 8 ignored line(s)"));
    }
}
