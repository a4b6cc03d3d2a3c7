//! Matches dynamic calls to removed or changed methods by name
//!
//! The receiver type of `$foo->bar()` is unknown without whole-project type
//! inference, so every configured `Fqcn->bar` rule whose argument window
//! fits the call is a candidate; all candidates merge into one weak hit.

use extscan_core::{merge_changelog_refs, Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Call, ClassLikeMemberSelector, Expression};

use crate::registry::{args_have_spread, MatchContext, Matcher};
use crate::rules::{argument_count_matches, RuleTable};

pub struct MethodCallMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> MethodCallMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for MethodCallMatcher<'t> {
    fn name(&self) -> &'static str {
        "MethodCallMatcher"
    }

    fn description(&self) -> &'static str {
        "Dynamic call to a removed or changed method, matched by name"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let (selector, argument_list) = match expr {
            Expression::Call(Call::Method(call)) => (&call.method, &call.argument_list),
            Expression::Call(Call::NullSafeMethod(call)) => (&call.method, &call.argument_list),
            _ => return,
        };
        let ClassLikeMemberSelector::Identifier(ident) = selector else {
            return;
        };

        let span = ident.span();
        let method = ctx.text(span);
        let count = argument_list.arguments.iter().count();
        let spread = args_have_spread(argument_list);

        let mut refs = Vec::new();
        for (key, rule) in self.table.candidates_for_member(method) {
            if key.contains("->") && argument_count_matches(rule, count, spread) {
                merge_changelog_refs(&mut refs, &rule.changelog_files);
            }
        }
        if refs.is_empty() {
            return;
        }

        self.hits.push(Hit::new(
            format!("Call to method {}()", method),
            ctx.line(span),
            Indicator::Weak,
            refs,
        ));
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}
