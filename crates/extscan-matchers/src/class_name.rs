//! Matches any class-identity usage of a removed or renamed class
//!
//! Covers instantiation, static method calls, static property and class
//! constant fetches (including `::class`), `instanceof`, use imports,
//! extends/implements clauses, and string literals already resolved as
//! factory-call arguments. Catch clauses and signature type hints are not
//! separate syntax-tree hooks; they are picked up by a text pass over the
//! whole source.

use std::sync::OnceLock;

use extscan_core::{parse_use_imports, Hit, Indicator};
use mago_span::HasSpan;
use mago_syntax::ast::{Access, BinaryOperator, Call, Expression, Literal, Statement};
use regex::Regex;

use crate::registry::{MatchContext, Matcher};
use crate::rules::RuleTable;

pub struct ClassNameMatcher<'t> {
    table: &'t RuleTable,
    hits: Vec<Hit>,
}

impl<'t> ClassNameMatcher<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            hits: Vec::new(),
        }
    }

    /// Record a hit if the raw reference written at `offset` resolves to a
    /// configured class
    fn check_reference(&mut self, raw: &str, offset: usize, ctx: &MatchContext<'_>) {
        let class = ctx.names.resolve(raw, offset);
        self.check_resolved(&class, offset, ctx);
    }

    fn check_resolved(&mut self, class: &str, offset: usize, ctx: &MatchContext<'_>) {
        let Some(rule) = self.table.get(class) else {
            return;
        };
        self.hits.push(Hit::new(
            format!("Use of class {}", class),
            extscan_core::line_of_offset(ctx.source, offset),
            Indicator::Strong,
            rule.changelog_files.clone(),
        ));
    }

    fn check_class_expression(&mut self, class_expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        if let Expression::Identifier(ident) = class_expr {
            let span = ident.span();
            self.check_reference(ctx.text(span), span.start.offset as usize, ctx);
        }
    }

    /// Scan an `extends`/`implements` clause in a class-like declaration
    /// header
    fn check_header(&mut self, header: &str, offset: usize, ctx: &MatchContext<'_>) {
        let mut collecting = false;
        for raw in header.split(|c: char| c.is_whitespace() || c == ',') {
            let token = raw.trim();
            if token.is_empty() {
                continue;
            }
            match token {
                "extends" | "implements" => collecting = true,
                _ if collecting => self.check_reference(token, offset, ctx),
                _ => {}
            }
        }
    }
}

impl<'t> Matcher for ClassNameMatcher<'t> {
    fn name(&self) -> &'static str {
        "ClassNameMatcher"
    }

    fn description(&self) -> &'static str {
        "Any class-identity usage of a removed or renamed class"
    }

    fn rule_count(&self) -> usize {
        self.table.len()
    }

    fn visit_statement(&mut self, stmt: &Statement<'_>, ctx: &MatchContext<'_>) {
        match stmt {
            Statement::Use(use_stmt) => {
                let span = use_stmt.span();
                let offset = span.start.offset as usize;
                for (_, fqcn) in parse_use_imports(ctx.text(span)) {
                    self.check_resolved(&fqcn, offset, ctx);
                }
            }
            Statement::Class(class) => {
                let span = class.span();
                let text = ctx.text(span);
                let header = &text[..text.find('{').unwrap_or(text.len())];
                self.check_header(header, span.start.offset as usize, ctx);
            }
            Statement::Interface(iface) => {
                let span = iface.span();
                let text = ctx.text(span);
                let header = &text[..text.find('{').unwrap_or(text.len())];
                self.check_header(header, span.start.offset as usize, ctx);
            }
            _ => {}
        }
    }

    fn visit_expression(&mut self, expr: &Expression<'_>, ctx: &MatchContext<'_>) {
        match expr {
            Expression::Instantiation(inst) => {
                self.check_class_expression(&inst.class, ctx);
            }
            Expression::Call(Call::StaticMethod(static_call)) => {
                self.check_class_expression(&static_call.class, ctx);
            }
            Expression::Access(Access::ClassConstant(access)) => {
                self.check_class_expression(&access.class, ctx);
            }
            Expression::Access(Access::StaticProperty(access)) => {
                self.check_class_expression(&access.class, ctx);
            }
            Expression::Binary(binary) => {
                if matches!(binary.operator, BinaryOperator::Instanceof(_)) {
                    self.check_class_expression(&binary.rhs, ctx);
                }
            }
            Expression::Literal(Literal::String(lit)) => {
                let offset = lit.span().start.offset as usize;
                if let Some(class) = ctx.factories.class_for_literal(offset) {
                    let class = class.to_string();
                    self.check_resolved(&class, offset, ctx);
                }
            }
            _ => {}
        }
    }

    fn scan_source(&mut self, ctx: &MatchContext<'_>) {
        // Catch clause type hints, including union hints
        static CATCH_RE: OnceLock<Regex> = OnceLock::new();
        let catch_re = CATCH_RE
            .get_or_init(|| Regex::new(r"\bcatch\s*\(\s*([A-Za-z_\\][\w\\|\s]*?)\s*[\$\)]").unwrap());
        for cap in catch_re.captures_iter(ctx.source) {
            if let Some(hint) = cap.get(1) {
                for part in hint.as_str().split('|') {
                    let part = part.trim();
                    if !part.is_empty() {
                        self.check_reference(part, hint.start(), ctx);
                    }
                }
            }
        }

        // Parameter and return type hints in function/method signatures
        static SIG_RE: OnceLock<Regex> = OnceLock::new();
        let sig_re = SIG_RE.get_or_init(|| {
            Regex::new(r"\bfunction[\s&]*\w*\s*\(([^)]*)\)(?:\s*:\s*\??\s*([A-Za-z_\\][\w\\]*))?")
                .unwrap()
        });
        static PARAM_RE: OnceLock<Regex> = OnceLock::new();
        let param_re = PARAM_RE.get_or_init(|| {
            Regex::new(r"(?:^|,)\s*\??\s*([A-Za-z_\\][\w\\]*)\s*(?:\.\.\.)?\s*&?\s*\$").unwrap()
        });
        for cap in sig_re.captures_iter(ctx.source) {
            if let Some(params) = cap.get(1) {
                for pcap in param_re.captures_iter(params.as_str()) {
                    if let Some(hint) = pcap.get(1) {
                        self.check_reference(hint.as_str(), params.start() + hint.start(), ctx);
                    }
                }
            }
            if let Some(ret) = cap.get(2) {
                self.check_reference(ret.as_str(), ret.start(), ctx);
            }
        }
    }

    fn take_hits(&mut self) -> Vec<Hit> {
        std::mem::take(&mut self.hits)
    }
}
