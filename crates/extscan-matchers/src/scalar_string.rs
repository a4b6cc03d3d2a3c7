//! Matches string literals spelling a configured fully qualified symbol
//!
//! Strings are matched only when they contain a namespace separator, which
//! keeps short common words from producing noise. Literals already resolved
//! as factory-call arguments are left to the class name matcher, which
//! reports them as strong hits.

use extscan_core::{Hit, Indicator, NameIndex};
use mago_span::HasSpan;
use mago_syntax::ast::{Expression, Literal};

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct ScalarStringMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ScalarStringMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for ScalarStringMatcher<'t> {
    fn name(&self) -> &'static str {
        "ScalarStringMatcher"
    }

    fn description(&self) -> &'static str {
        "String literal spelling a removed fully qualified symbol"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::Literal(Literal::String(lit)) = expr else {
            return;
        };
        let span = lit.span();
        if ctx
            .factories
            .class_for_literal(span.start.offset as usize)
            .is_some()
        {
            return;
        }
        let Some(raw) = ctx.string_literal_value(span) else {
            return;
        };

        let value = NameIndex::normalize_class_string(raw);
        if !value.contains('\\') {
            return;
        }
        let Some(rule) = self.table.get(&value) else {
            return;
        };

        self.hits.push(Hit::new(
            format!("String literal referencing {}", value),
            ctx.line(span),
            Indicator::Weak,
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
        let factory_methods = vec!["Cms\\Core\\Utility\\GeneralUtility::makeInstance".to_string()];
        let factories = collect_factory_calls(program, source, &names, &factory_methods);
        let stats = CodeStatistics::analyze(source);
        let ctx = MatchContext {
            source,
            names: &names,
            factories: &factories,
        };
        let table = RuleTable::from_json(table_json).unwrap();
        let mut set = MatcherSet::new(vec![Box::new(ScalarStringMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "Cms\\Core\\Cache\\CacheFactory": {
            "changelogFiles": ["Breaking-82093-RemovedCacheFactory.rst"]
        }
    }"#;

    #[test]
    fn test_string_literal_matches_weak() {
        let hits = hits_for(TABLE, "<?php\n$name = 'Cms\\\\Core\\\\Cache\\\\CacheFactory';\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].indicator, Indicator::Weak);
        assert_eq!(hits[0].line, 2);
    }

    #[test]
    fn test_leading_backslash_form_matches() {
        let hits = hits_for(TABLE, "<?php\n$name = '\\\\Cms\\\\Core\\\\Cache\\\\CacheFactory';\n");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_factory_argument_is_left_to_the_class_name_matcher() {
        let source = "<?php\n$c = \\Cms\\Core\\Utility\\GeneralUtility::makeInstance('Cms\\\\Core\\\\Cache\\\\CacheFactory');\n";
        let hits = hits_for(TABLE, source);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_string_without_separator_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$name = 'CacheFactory';\n");
        assert!(hits.is_empty());
    }
}
