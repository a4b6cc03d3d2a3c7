//! Matches calls that pass fewer arguments than a now-mandatory count
//!
//! A formerly optional parameter became mandatory; a call relying on the
//! old default breaks. Matched by method name only, so candidates merge
//! into one weak hit. Argument unpacking may supply the missing arguments
//! and such calls are not flagged.

use extscan_core::{merge_changelog_refs, Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Call, ClassLikeMemberSelector, Expression};

use crate::registry::{args_have_spread, MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct MethodArgumentRequiredMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> MethodArgumentRequiredMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for MethodArgumentRequiredMatcher<'t> {
    fn name(&self) -> &'static str {
        "MethodArgumentRequiredMatcher"
    }

    fn description(&self) -> &'static str {
        "Call passing fewer arguments than a now-mandatory count"
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
        if args_have_spread(argument_list) {
            return;
        }

        let mut refs = Vec::new();
        for (key, rule) in self.table.candidates_for_member(method) {
            let Some(mandatory) = rule.mandatory_arguments else {
                continue;
            };
            if key.contains("->") && count < mandatory {
                merge_changelog_refs(&mut refs, &rule.changelog_files);
            }
        }
        if refs.is_empty() {
            return;
        }

        self.hits.push(Hit::new(
            format!("Call to method {}() with too few arguments", method),
            ctx.line(span),
            Indicator::Weak,
            refs,
        ));
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}
