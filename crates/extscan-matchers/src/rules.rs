//! Symbol rule tables
//!
//! Each matcher is configured from its own static table mapping a fully
//! qualified symbol key to the changelog documents explaining its removal or
//! deprecation, plus optional argument-count restrictions. Tables are loaded
//! and validated once per scan session and shared read-only afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// One configured pattern to detect
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SymbolRule {
    /// Number of arguments the old signature required
    #[serde(default)]
    pub mandatory_arguments: Option<usize>,
    /// Number of arguments the old signature accepted at most
    #[serde(default)]
    pub maximum_arguments: Option<usize>,
    /// Changelog document filenames explaining the change
    pub changelog_files: Vec<String>,
}

/// Errors raised while loading or validating a rule table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule \"{0}\" lists no changelog files")]
    EmptyChangelog(String),

    #[error("rule \"{0}\" has mandatoryArguments > maximumArguments")]
    InvalidArgumentWindow(String),
}

/// Immutable, ordered table of symbol rules for one matcher
///
/// Keys are unique by construction (JSON object); ordering is lexicographic
/// so candidate iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: BTreeMap<String, SymbolRule>,
}

impl RuleTable {
    /// Parse and validate a table from its JSON text
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let entries: BTreeMap<String, SymbolRule> = serde_json::from_str(json)?;
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Parse and validate a table file
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), TableError> {
        for (key, rule) in &self.entries {
            if rule.changelog_files.is_empty() {
                return Err(TableError::EmptyChangelog(key.clone()));
            }
            if let (Some(min), Some(max)) = (rule.mandatory_arguments, rule.maximum_arguments) {
                if min > max {
                    return Err(TableError::InvalidArgumentWindow(key.clone()));
                }
            }
        }
        Ok(())
    }

    /// Exact lookup by fully qualified symbol key
    pub fn get(&self, key: &str) -> Option<&SymbolRule> {
        self.entries.get(key)
    }

    /// Rules whose key ends in `->member` or `::member`, for weak matchers
    /// that only know the member name of a call or access
    pub fn candidates_for_member(&self, member: &str) -> Vec<(&str, &SymbolRule)> {
        let arrow_suffix = format!("->{}", member);
        let static_suffix = format!("::{}", member);
        self.entries
            .iter()
            .filter(|(key, _)| key.ends_with(&arrow_suffix) || key.ends_with(&static_suffix))
            .map(|(key, rule)| (key.as_str(), rule))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolRule)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether an argument count satisfies a rule's window
///
/// Calls using argument unpacking make the count unknowable statically and
/// are treated as a possible match.
pub fn argument_count_matches(rule: &SymbolRule, count: usize, has_spread: bool) -> bool {
    if has_spread {
        return true;
    }
    if let Some(min) = rule.mandatory_arguments {
        if count < min {
            return false;
        }
    }
    if let Some(max) = rule.maximum_arguments {
        if count > max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_rules_with_restrictions() {
        let json = r#"{
            "Cms\\Core\\TimeTracker\\TimeTracker->setTSlogMessage": {
                "mandatoryArguments": 1,
                "maximumArguments": 2,
                "changelogFiles": ["Deprecation-91234-TimeTrackerLogging.rst"]
            }
        }"#;
        let table = RuleTable::from_json(json).unwrap();
        let rule = table
            .get("Cms\\Core\\TimeTracker\\TimeTracker->setTSlogMessage")
            .unwrap();
        assert_eq!(rule.mandatory_arguments, Some(1));
        assert_eq!(rule.maximum_arguments, Some(2));
        assert_eq!(rule.changelog_files.len(), 1);
    }

    #[test]
    fn test_rejects_empty_changelog_list() {
        let json = r#"{ "Cms\\Core\\Cache\\CacheFactory": { "changelogFiles": [] } }"#;
        assert!(matches!(
            RuleTable::from_json(json),
            Err(TableError::EmptyChangelog(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_argument_window() {
        let json = r#"{
            "Foo->bar": {
                "mandatoryArguments": 3,
                "maximumArguments": 1,
                "changelogFiles": ["Foo.rst"]
            }
        }"#;
        assert!(matches!(
            RuleTable::from_json(json),
            Err(TableError::InvalidArgumentWindow(_))
        ));
    }

    #[test]
    fn test_candidates_for_member() {
        let json = r#"{
            "Foo->render": { "changelogFiles": ["Foo.rst"] },
            "Bar->render": { "changelogFiles": ["Bar.rst"] },
            "Baz->other": { "changelogFiles": ["Baz.rst"] }
        }"#;
        let table = RuleTable::from_json(json).unwrap();
        let candidates = table.candidates_for_member("render");
        assert_eq!(candidates.len(), 2);
        // BTreeMap ordering keeps candidate iteration deterministic
        assert_eq!(candidates[0].0, "Bar->render");
        assert_eq!(candidates[1].0, "Foo->render");
    }

    #[test]
    fn test_argument_count_window() {
        let rule = SymbolRule {
            mandatory_arguments: Some(1),
            maximum_arguments: Some(2),
            changelog_files: vec!["Foo.rst".to_string()],
        };
        assert!(!argument_count_matches(&rule, 0, false));
        assert!(argument_count_matches(&rule, 1, false));
        assert!(argument_count_matches(&rule, 2, false));
        assert!(!argument_count_matches(&rule, 3, false));
        assert!(argument_count_matches(&rule, 7, true));
    }
}
