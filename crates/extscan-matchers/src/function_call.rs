//! Matches calls to removed global functions
//!
//! Rules may carry an argument window when only certain call shapes are
//! affected, e.g. a dropped optional parameter.

use extscan_core::{Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Call, Expression};

use crate::registry::{args_have_spread, MatchContext, Matcher};
use crate::rules::{argument_count_matches, RuleTable};

pub struct FunctionCallMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> FunctionCallMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for FunctionCallMatcher<'t> {
    fn name(&self) -> &'static str {
        "FunctionCallMatcher"
    }

    fn description(&self) -> &'static str {
        "Call to a removed global function"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::Call(Call::Function(func_call)) = expr else {
            return;
        };
        let Expression::Identifier(ident) = &*func_call.function else {
            return;
        };

        let span = ident.span();
        let name = ctx.text(span).trim_start_matches('\\');
        let Some(rule) = self.table.get(name) else {
            return;
        };

        let count = func_call.argument_list.arguments.iter().count();
        let spread = args_have_spread(&func_call.argument_list);
        if !argument_count_matches(rule, count, spread) {
            return;
        }

        self.hits.push(Hit::new(
            format!("Call to function {}()", name),
            ctx.line(span),
            Indicator::Strong,
            rule.changelog_files.clone(),
        ));
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}
