//! Matches accesses to removed or protected public properties by name
//!
//! Like the dynamic method matchers, the object type is unknown, so every
//! `Fqcn->property` rule with the accessed name is a candidate and all
//! candidates merge into one weak hit with de-duplicated changelog
//! references.

use extscan_core::{merge_changelog_refs, Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Access, ClassLikeMemberSelector, Expression};

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct PropertyPublicMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> PropertyPublicMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for PropertyPublicMatcher<'t> {
    fn name(&self) -> &'static str {
        "PropertyPublicMatcher"
    }

    fn description(&self) -> &'static str {
        "Access to a removed or protected public property, matched by name"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let selector = match expr {
            Expression::Access(Access::Property(access)) => &access.property,
            Expression::Access(Access::NullSafeProperty(access)) => &access.property,
            _ => return,
        };
        let ClassLikeMemberSelector::Identifier(ident) = selector else {
            return;
        };

        let span = ident.span();
        let property = ctx.text(span);

        let mut refs = Vec::new();
        for (key, rule) in self.table.candidates_for_member(property) {
            if key.contains("->") {
                merge_changelog_refs(&mut refs, &rule.changelog_files);
            }
        }
        if refs.is_empty() {
            return;
        }

        self.hits.push(Hit::new(
            format!("Access to property ->{}", property),
            ctx.line(span),
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
        let mut set = MatcherSet::new(vec![Box::new(PropertyPublicMatcher::new(&table))]);
        set.run(program, &ctx, &stats)
    }

    const TABLE: &str = r#"{
        "Cms\\Frontend\\Controller\\FrontendController->workspacePreview": {
            "changelogFiles": ["Breaking-81318-WorkspacePreview.rst"]
        },
        "Cms\\Backend\\Template\\DocumentTemplate->workspacePreview": {
            "changelogFiles": ["Breaking-81318-WorkspacePreview.rst", "Deprecation-81320-DocTemplate.rst"]
        }
    }"#;

    #[test]
    fn test_candidates_merge_and_refs_deduplicate() {
        let hits = hits_for(TABLE, "<?php\n$preview = $controller->workspacePreview;\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].indicator, Indicator::Weak);
        assert_eq!(
            hits[0].changelog_refs,
            vec![
                "Breaking-81318-WorkspacePreview.rst",
                "Deprecation-81320-DocTemplate.rst"
            ]
        );
    }

    #[test]
    fn test_nullsafe_access_matches() {
        let hits = hits_for(TABLE, "<?php\n$p = $controller?->workspacePreview;\n");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_other_property_does_not_match() {
        let hits = hits_for(TABLE, "<?php\n$id = $controller->id;\n");
        assert!(hits.is_empty());
    }
}
