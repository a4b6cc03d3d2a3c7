//! Matches reads of removed entries in the `$GLOBALS` superglobal

use extscan_core::{Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Expression, Literal, Variable};

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct ArrayGlobalMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ArrayGlobalMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }
}

impl<'t> Matcher for ArrayGlobalMatcher<'t> {
    fn name(&self) -> &'static str {
        "ArrayGlobalMatcher"
    }

    fn description(&self) -> &'static str {
        "Read of a removed $GLOBALS entry"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        let Expression::ArrayAccess(access) = expr else {
            return;
        };
        let Expression::Variable(Variable::Direct(var)) = &*access.array else {
            return;
        };
        if ctx.text(var.span()) != "$GLOBALS" {
            return;
        }
        let Expression::Literal(Literal::String(lit)) = &*access.index else {
            return;
        };
        let Some(index) = ctx.string_literal_value(lit.span()) else {
            return;
        };

        let key = format!("$GLOBALS['{}']", index);
        let Some(rule) = self.table.get(&key) else {
            return;
        };

        self.hits.push(Hit::new(
            format!("Use of {}", key),
            ctx.line(access.span()),
            Indicator::Strong,
            rule.changelog_files.clone(),
        ));
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}
