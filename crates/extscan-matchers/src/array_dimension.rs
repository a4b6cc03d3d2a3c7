//! Matches reads of a configured array index by its last dimension
//!
//! Table keys are full array paths like
//! `$GLOBALS['CMS_CONF_VARS']['FE']['pageCacheHandler']`; only the last
//! dimension can be checked without data-flow analysis, so every candidate
//! rule ending in the accessed index merges into one weak hit.

use extscan_core::{merge_changelog_refs, Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Expression, Literal};

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct ArrayDimensionMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ArrayDimensionMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for ArrayDimensionMatcher<'t> {
    fn name(&self) -> &'static str {
        "ArrayDimensionMatcher"
    }

    fn description(&self) -> &'static str {
        "String array index of a removed or changed configuration path"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::ArrayAccess(access) = expr else {
            return;
        };
        let Expression::Literal(Literal::String(lit)) = &*access.index else {
            return;
        };
        let Some(index) = ctx.string_literal_value(lit.span()) else {
            return;
        };

        let suffix = format!("['{}']", index);
        let mut refs = Vec::new();
        for (key, rule) in self.table.iter() {
            if key.ends_with(&suffix) {
                merge_changelog_refs(&mut refs, &rule.changelog_files);
            }
        }
        if refs.is_empty() {
            return;
        }

        self.hits.push(Hit::new(
            format!("Access to array index '{}'", index),
            ctx.line(access.span()),
            Indicator::Weak,
            refs,
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
        let mut set = MatcherSet::new(vec![Box::new(ArrayDimensionMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "$GLOBALS['CMS_CONF_VARS']['FE']['pageCacheHandler']": {
            "changelogFiles": ["Breaking-80700-PageCacheHandler.rst"]
        },
        "$config['FE']['pageCacheHandler']": {
            "changelogFiles": ["Deprecation-80701-ConfigCacheHandler.rst"]
        }
    }"#;

    #[test]
    fn test_matching_last_dimension_merges_candidates_into_one_weak_hit() {
        let hits = hits_for(TABLE, "<?php\n$a = $foo['pageCacheHandler'];\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 2);
        assert_eq!(hits[0].indicator, Indicator::Weak);
        assert_eq!(
            hits[0].changelog_refs,
            vec![
                "Breaking-80700-PageCacheHandler.rst",
                "Deprecation-80701-ConfigCacheHandler.rst"
            ]
        );
    }

    #[test]
    fn test_other_index_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$a = $foo['otherKey'];\n");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_variable_index_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$a = $foo[$key];\n");
        assert!(hits.is_empty());
    }
}
