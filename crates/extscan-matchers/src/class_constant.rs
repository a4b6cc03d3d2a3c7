//! Matches fetches of removed class constants, `Fqcn::CONSTANT`
//!
//! The class part must be a resolvable identifier; `::class` fetches are
//! class identity usage and belong to the class name matcher.

use extscan_core::{Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Access, ClassLikeConstantSelector, Expression};

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct ClassConstantMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ClassConstantMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for ClassConstantMatcher<'t> {
    fn name(&self) -> &'static str {
        "ClassConstantMatcher"
    }

    fn description(&self) -> &'static str {
        "Fetch of a removed class constant"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::Access(Access::ClassConstant(access)) = expr else {
            return;
        };
        let Expression::Identifier(class_ident) = &*access.class else {
            return;
        };
        let ClassLikeConstantSelector::Identifier(const_ident) = &access.constant else {
            return;
        };

        let constant = ctx.text(const_ident.span());
        if constant.eq_ignore_ascii_case("class") {
            return;
        }

        let class_span = class_ident.span();
        let class = ctx
            .names
            .resolve(ctx.text(class_span), class_span.start.offset as usize);
        let key = format!("{}::{}", class, constant);
        let Some(rule) = self.table.get(&key) else {
            return;
        };

        self.hits.push(Hit::new(
            format!("Use of class constant {}", key),
            ctx.line(class_span),
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
        let mut set = MatcherSet::new(vec![Box::new(ClassConstantMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "Cms\\Core\\Page\\PageRenderer::JQUERY_NAMESPACE_DEFAULT": {
            "changelogFiles": ["Breaking-82378-RemovedJqueryNamespace.rst"]
        }
    }"#;

    #[test]
    fn test_fully_qualified_constant_fetch_matches() {
        let hits = hits_for(
            TABLE,
            "<?php\n$ns = \\Cms\\Core\\Page\\PageRenderer::JQUERY_NAMESPACE_DEFAULT;\n",
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].indicator, Indicator::Strong);
        assert_eq!(hits[0].line, 2);
    }

    #[test]
    fn test_imported_short_name_matches() {
        let source = "<?php\nuse Cms\\Core\\Page\\PageRenderer;\n$ns = PageRenderer::JQUERY_NAMESPACE_DEFAULT;\n";
        let hits = hits_for(TABLE, source);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 3);
    }

    #[test]
    fn test_class_fetch_is_not_a_constant_hit() {
        let hits = hits_for(TABLE, "<?php\n$c = \\Cms\\Core\\Page\\PageRenderer::class;\n");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_other_constant_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$x = \\Cms\\Core\\Page\\PageRenderer::OTHER;\n");
        assert!(hits.is_empty());
    }
}
