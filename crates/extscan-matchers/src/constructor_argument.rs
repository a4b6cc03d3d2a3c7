//! Matches instantiations of classes whose constructor signature changed
//!
//! A rule's argument window describes the call shapes affected by the
//! change; direct `new` expressions and factory calls resolved by the
//! factory pass are both checked. Argument unpacking makes the count
//! unknowable and is treated as a possible match.

use extscan_core::{Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Call, Expression};

use crate::registry::{args_have_spread, MatchContext, Matcher};
use crate::rules::{argument_count_matches, RuleTable};

pub struct ConstructorArgumentMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ConstructorArgumentMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }

    fn check(&mut self, class: &str, count: usize, spread: bool, offset: usize, ctx: &MatchContext<'_>) {
        let Some(rule) = self.table.get(class) else {
            return;
        };
        if !argument_count_matches(rule, count, spread) {
            return;
        }
        self.hits.push(Hit::new(
            format!("Instantiation of {} with {} argument(s)", class, count),
            extscan_core::line_of_offset(ctx.source, offset),
            Indicator::Strong,
            rule.changelog_files.clone(),
        ));
    }
}

impl<'t> Matcher for ConstructorArgumentMatcher<'t> {
    fn name(&self) -> &'static str {
        "ConstructorArgumentMatcher"
    }

    fn description(&self) -> &'static str {
        "Instantiation with a constructor argument count affected by a signature change"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        match expr {
            Expression::Instantiation(inst) => {
                let Expression::Identifier(ident) = &*inst.class else {
                    return;
                };
                let span = ident.span();
                let class = ctx.names.resolve(ctx.text(span), span.start.offset as usize);

                let mut count = 0;
                let mut spread = false;
                for arg_list in inst.argument_list.iter() {
                    count = arg_list.arguments.iter().count();
                    spread = args_have_spread(arg_list);
                }
                self.check(&class, count, spread, span.start.offset as usize, ctx);
            }
            Expression::Call(Call::StaticMethod(static_call)) => {
                // Factory calls: the class is the resolved literal first
                // argument, the relevant count excludes that argument
                let mut args = static_call.argument_list.arguments.iter();
                let Some(first) = args.next() else {
                    return;
                };
                let offset = first.value().span().start.offset as usize;
                let Some(class) = ctx.factories.class_for_literal(offset) else {
                    return;
                };
                let class = class.to_string();
                let count = args.count();
                let spread = args_have_spread(&static_call.argument_list);
                self.check(&class, count, spread, offset, ctx);
            }
            _ => {}
        }
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
        let mut set = MatcherSet::new(vec![Box::new(ConstructorArgumentMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "Cms\\Core\\Mail\\MailMessage": {
            "mandatoryArguments": 2,
            "maximumArguments": 4,
            "changelogFiles": ["Breaking-82694-MailMessageConstructor.rst"]
        }
    }"#;

    #[test]
    fn test_count_inside_window_matches() {
        let hits = hits_for(TABLE, "<?php\n$m = new \\Cms\\Core\\Mail\\MailMessage($a, $b, $c);\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].indicator, Indicator::Strong);
        assert_eq!(hits[0].line, 2);
    }

    #[test]
    fn test_count_outside_window_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$m = new \\Cms\\Core\\Mail\\MailMessage();\n");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_spread_is_a_possible_match() {
        let hits = hits_for(TABLE, "<?php\n$m = new \\Cms\\Core\\Mail\\MailMessage(...$args);\n");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_factory_call_argument_count_excludes_class_literal() {
        let source = "<?php\n$m = \\Cms\\Core\\Utility\\GeneralUtility::makeInstance('Cms\\\\Core\\\\Mail\\\\MailMessage', $a, $b);\n";
        let hits = hits_for(TABLE, source);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_factory_call_with_too_few_arguments_does_not_match() {
        let source = "<?php\n$m = \\Cms\\Core\\Utility\\GeneralUtility::makeInstance('Cms\\\\Core\\\\Mail\\\\MailMessage');\n";
        let hits = hits_for(TABLE, source);
        assert!(hits.is_empty());
    }
}
