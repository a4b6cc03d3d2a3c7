//! Matches static calls to removed or changed methods
//!
//! When the class part is a resolvable identifier the lookup is exact and
//! the hit is strong. Calls through a variable or expression class fall
//! back to matching by method name, merging all candidates into one weak
//! hit.

use extscan_core::{merge_changelog_refs, Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Call, ClassLikeMemberSelector, Expression};

use crate::registry::{args_have_spread, MatchContext, Matcher};
use crate::rules::{argument_count_matches, RuleTable};

pub struct MethodCallStaticMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> MethodCallStaticMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for MethodCallStaticMatcher<'t> {
    fn name(&self) -> &'static str {
        "MethodCallStaticMatcher"
    }

    fn description(&self) -> &'static str {
        "Static call to a removed or changed method"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::Call(Call::StaticMethod(static_call)) = expr else {
            return;
        };
        let ClassLikeMemberSelector::Identifier(method_ident) = &static_call.method else {
            return;
        };

        let method_span = method_ident.span();
        let method = ctx.text(method_span);
        let count = static_call.argument_list.arguments.iter().count();
        let spread = args_have_spread(&static_call.argument_list);

        if let Expression::Identifier(class_ident) = &*static_call.class {
            let class_span = class_ident.span();
            let class = ctx
                .names
                .resolve(ctx.text(class_span), class_span.start.offset as usize);
            let key = format!("{}::{}", class, method);
            let Some(rule) = self.table.get(&key) else {
                return;
            };
            if !argument_count_matches(rule, count, spread) {
                return;
            }
            self.hits.push(Hit::new(
                format!("Static call to {}()", key),
                ctx.line(class_span),
                Indicator::Strong,
                rule.changelog_files.clone(),
            ));
            return;
        }

        let mut refs = Vec::new();
        for (key, rule) in self.table.candidates_for_member(method) {
            if key.contains("::") && argument_count_matches(rule, count, spread) {
                merge_changelog_refs(&mut refs, &rule.changelog_files);
            }
        }
        if refs.is_empty() {
            return;
        }

        self.hits.push(Hit::new(
            format!("Static call to method {}()", method),
            ctx.line(method_span),
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
        let mut set = MatcherSet::new(vec![Box::new(MethodCallStaticMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "Cms\\Core\\Utility\\GeneralUtility::getUserObj": {
            "mandatoryArguments": 1,
            "maximumArguments": 1,
            "changelogFiles": ["Deprecation-80993-GetUserObj.rst"]
        }
    }"#;

    #[test]
    fn test_resolved_class_matches_strong() {
        let source = "<?php\nuse Cms\\Core\\Utility\\GeneralUtility;\n$o = GeneralUtility::getUserObj($ref);\n";
        let hits = hits_for(TABLE, source);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].indicator, Indicator::Strong);
        assert_eq!(hits[0].line, 3);
    }

    #[test]
    fn test_variable_class_matches_weak_by_method_name() {
        let hits = hits_for(TABLE, "<?php\n$o = $utility::getUserObj($ref);\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].indicator, Indicator::Weak);
    }

    #[test]
    fn test_argument_window_applies() {
        let source = "<?php\n$o = \\Cms\\Core\\Utility\\GeneralUtility::getUserObj($a, $b);\n";
        let hits = hits_for(TABLE, source);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_unconfigured_class_does_not_match_strong() {
        let hits = hits_for(TABLE, "<?php\n$o = \\Other\\Utility::getUserObj($ref);\n");
        assert!(hits.is_empty());
    }
}
