//! Matches reads of removed global constants

use extscan_core::{Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::Expression;

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct ConstantMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ConstantMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for ConstantMatcher<'t> {
    fn name(&self) -> &'static str {
        "ConstantMatcher"
    }

    fn description(&self) -> &'static str {
        "Read of a removed global constant"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::ConstantAccess(access) = expr else {
            return;
        };
        let span = access.span();
        let name = ctx.text(span).trim_start_matches('\\');
        let Some(rule) = self.table.get(name) else {
            return;
        };

        self.hits.push(Hit::new(
            format!("Use of constant {}", name),
            ctx.line(span),
            Indicator::Strong,
            rule.changelog_files.clone(),
        ));
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MatcherSet;
    use bumpalo::Bump;
    use extscan_core::{collect_factory_calls, collect_names, CodeStatistics};
    use mago_database::file::FileId;

    fn hits_for(table_json: &str, source: &str) -> Vec<Hit> {
        let arena = Bump::new();
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, source);
        let names = collect_names(program, source);
        let factories = collect_factory_calls(program, source, &names, &[]);
        let stats = CodeStatistics::analyze(source);
        let ctx = MatchContext {
            source,
            names: &names,
            factories: &factories,
        };
        let table = RuleTable::from_json(table_json).unwrap();
        let mut set = MatcherSet::new(vec![Box::new(ConstantMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "CMS_DB": { "changelogFiles": ["Breaking-80929-CmsDbConstant.rst"] }
    }"#;

    #[test]
    fn test_constant_read_matches_strong() {
        let hits = hits_for(TABLE, "<?php\n$db = CMS_DB;\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 2);
        assert_eq!(hits[0].indicator, Indicator::Strong);
    }

    #[test]
    fn test_leading_backslash_matches_too() {
        let hits = hits_for(TABLE, "<?php\n$db = \\CMS_DB;\n");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_other_constant_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$x = PHP_EOL;\n");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_string_with_same_text_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$x = 'CMS_DB';\n");
        assert!(hits.is_empty());
    }
}
