//! Matches removed annotations in docblock comments
//!
//! Docblocks are not part of the traversed tree, so this matcher works on
//! the raw source: every `/** ... */` block is searched for the configured
//! annotation names.

use std::sync::OnceLock;

use extscan_core::{line_of_offset, Hit, Indicator};
use regex::Regex;

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct AnnotationMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> AnnotationMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for AnnotationMatcher<'t> {
    fn name(&self) -> &'static str {
        "AnnotationMatcher"
    }

    fn description(&self) -> &'static str {
        "Removed docblock annotation"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn scan_source(&mut self, ctx: &MatchContext<'_>) {
        static DOCBLOCK_RE: OnceLock<Regex> = OnceLock::new();
        let docblock_re = DOCBLOCK_RE.get_or_init(|| Regex::new(r"(?s)/\*\*.*?\*/").unwrap());

        for block in docblock_re.find_iter(ctx.source) {
            let text = block.as_str();
            for (annotation, rule) in self.table.iter() {
                let mut search = 0;
                while let Some(pos) = text[search..].find(annotation) {
                    let start = search + pos;
                    let end = start + annotation.len();
                    search = end;
                    // Do not match a longer annotation sharing the prefix
                    if text[end..]
                        .chars()
                        .next()
                        .map(|c| c.is_alphanumeric() || c == '_')
                        .unwrap_or(false)
                    {
                        continue;
                    }
                    self.hits.push(Hit::new(
                        format!("Use of annotation {}", annotation),
                        line_of_offset(ctx.source, block.start() + start),
                        Indicator::Weak,
                        rule.changelog_files.clone(),
                    ));
                }
            }
        }
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}
