//! Matcher registry and single-pass dispatch
//!
//! All matchers of one scan share a single depth-first traversal: the
//! `MatcherSet` walks the tree once and hands every statement and expression
//! node to each registered matcher in registration order. Matchers accumulate
//! hits internally; the set drains them afterwards, keeping registration
//! order first and traversal order within a matcher.

use std::collections::BTreeSet;
use std::path::Path;

use extscan_core::{
    visit, CodeStatistics, FactoryIndex, Hit, NameIndex, Visitor,
};
use mago_span::Span;
use mago_syntax::ast::{ArgumentList, Expression, Program, Statement};

use crate::rules::{RuleTable, TableError};
use crate::{
    annotation::AnnotationMatcher, array_dimension::ArrayDimensionMatcher,
    array_global::ArrayGlobalMatcher, class_constant::ClassConstantMatcher,
    class_name::ClassNameMatcher, constant::ConstantMatcher,
    constructor_argument::ConstructorArgumentMatcher, function_call::FunctionCallMatcher,
    method_argument_required::MethodArgumentRequiredMatcher, method_call::MethodCallMatcher,
    method_call_static::MethodCallStaticMatcher, property_public::PropertyPublicMatcher,
    scalar_string::ScalarStringMatcher,
};

/// Read-only per-file context shared by all matchers of one scan
pub struct MatchContext<'s> {
    pub source: &'s str,
    pub names: &'s NameIndex,
    pub factories: &'s FactoryIndex,
}

impl<'s> MatchContext<'s> {
    /// Literal source text of a span
    pub fn text(&self, span: Span) -> &'s str {
        &self.source[span.start.offset as usize..span.end.offset as usize]
    }

    /// 1-based line of a span start
    pub fn line(&self, span: Span) -> usize {
        extscan_core::line_of_offset(self.source, span.start.offset as usize)
    }

    /// Inner value of a single-quoted or double-quoted string literal span
    pub fn string_literal_value(&self, span: Span) -> Option<&'s str> {
        let text = self.text(span);
        let first = text.chars().next()?;
        if (first == '\'' || first == '"') && text.len() >= 2 && text.ends_with(first) {
            Some(&text[1..text.len() - 1])
        } else {
            None
        }
    }

}

/// Whether an argument list uses argument unpacking, making its argument
/// count unknowable statically
pub fn args_have_spread(arguments: &ArgumentList<'_>) -> bool {
    arguments.arguments.iter().any(|arg| arg.is_unpacked())
}

/// One pattern matcher inspecting a single syntactic category
///
/// Hooks default to no-ops; a matcher overrides the hooks for the node
/// kinds it inspects and pushes hits into its internal list. `take_hits`
/// drains that list after the traversal.
pub trait Matcher {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Number of configured rules
    fn rule_count(&self) -> usize;

    fn visit_statement(&mut self, _stmt: &Statement<'_>, _ctx: &MatchContext<'_>) {}

    fn visit_expression(&mut self, _expr: &Expression<'_>, _ctx: &MatchContext<'_>) {}

    /// One whole-source hook after traversal, for text-level matching that
    /// the syntax tree does not expose (docblocks, catch type hints)
    fn scan_source(&mut self, _ctx: &MatchContext<'_>) {}

    fn take_hits(&mut self) -> Vec<Hit>;
}

/// Ordered matchers of one scan session, driven over a single traversal
pub struct MatcherSet<'t> {
    matchers: Vec<Box<dyn Matcher + 't>>,
}

impl<'t> MatcherSet<'t> {
    pub fn new(matchers: Vec<Box<dyn Matcher + 't>>) -> Self {
        Self { matchers }
    }

    /// Name, description and rule count of each matcher, in registration
    /// order
    pub fn describe(&self) -> Vec<(&'static str, &'static str, usize)> {
        self.matchers
            .iter()
            .map(|m| (m.name(), m.description(), m.rule_count()))
            .collect()
    }

    /// Walk the tree once, dispatch every node to all matchers, then drain
    /// hits in registration order. Hits on ignored lines are suppressed, as
    /// is everything when the whole file opted out.
    pub fn run(
        &mut self,
        program: &Program<'_>,
        ctx: &MatchContext<'_>,
        stats: &CodeStatistics,
    ) -> Vec<Hit> {
        {
            let mut walker = MatcherWalker {
                matchers: &mut self.matchers,
                ctx,
            };
            visit(&mut walker, program, ctx.source);
        }

        let mut hits = Vec::new();
        for matcher in self.matchers.iter_mut() {
            matcher.scan_source(ctx);
            for hit in matcher.take_hits() {
                if !stats.is_line_ignored(hit.line) {
                    hits.push(hit);
                }
            }
        }
        hits
    }
}

struct MatcherWalker<'w, 't> {
    matchers: &'w mut Vec<Box<dyn Matcher + 't>>,
    ctx: &'w MatchContext<'w>,
}

impl<'a, 'w, 't> Visitor<'a> for MatcherWalker<'w, 't> {
    fn visit_statement(&mut self, stmt: &Statement<'a>, _source: &str) -> bool {
        for matcher in self.matchers.iter_mut() {
            matcher.visit_statement(stmt, self.ctx);
        }
        true
    }

    fn visit_expression(&mut self, expr: &Expression<'a>, _source: &str) -> bool {
        for matcher in self.matchers.iter_mut() {
            matcher.visit_expression(expr, self.ctx);
        }
        true
    }
}

/// The rule tables of all thirteen matchers
#[derive(Debug, Clone, Default)]
pub struct MatcherTables {
    pub array_dimension: RuleTable,
    pub array_global: RuleTable,
    pub class_constant: RuleTable,
    pub class_name: RuleTable,
    pub constant: RuleTable,
    pub constructor_argument: RuleTable,
    pub annotation: RuleTable,
    pub function_call: RuleTable,
    pub method_argument_required: RuleTable,
    pub method_call: RuleTable,
    pub method_call_static: RuleTable,
    pub property_public: RuleTable,
    pub scalar_string: RuleTable,
}

/// A table file that failed to load or validate; the matcher falls back to
/// its built-in table
#[derive(Debug)]
pub struct TableIssue {
    pub table: String,
    pub error: TableError,
}

impl MatcherTables {
    /// The tables compiled into the binary
    pub fn builtin() -> Result<Self, TableError> {
        Ok(Self {
            array_dimension: RuleTable::from_json(include_str!("../tables/array_dimension.json"))?,
            array_global: RuleTable::from_json(include_str!("../tables/array_global.json"))?,
            class_constant: RuleTable::from_json(include_str!("../tables/class_constant.json"))?,
            class_name: RuleTable::from_json(include_str!("../tables/class_name.json"))?,
            constant: RuleTable::from_json(include_str!("../tables/constant.json"))?,
            constructor_argument: RuleTable::from_json(include_str!(
                "../tables/constructor_argument.json"
            ))?,
            annotation: RuleTable::from_json(include_str!("../tables/annotation.json"))?,
            function_call: RuleTable::from_json(include_str!("../tables/function_call.json"))?,
            method_argument_required: RuleTable::from_json(include_str!(
                "../tables/method_argument_required.json"
            ))?,
            method_call: RuleTable::from_json(include_str!("../tables/method_call.json"))?,
            method_call_static: RuleTable::from_json(include_str!(
                "../tables/method_call_static.json"
            ))?,
            property_public: RuleTable::from_json(include_str!("../tables/property_public.json"))?,
            scalar_string: RuleTable::from_json(include_str!("../tables/scalar_string.json"))?,
        })
    }

    /// Built-in tables overridden by any `<matcher>.json` files found in
    /// `dir`. A file that fails to load or validate is reported as an issue
    /// and its matcher keeps the built-in table, so one bad table cannot
    /// block the other matchers.
    pub fn from_dir(dir: &Path) -> Result<(Self, Vec<TableIssue>), TableError> {
        let mut tables = Self::builtin()?;
        let mut issues = Vec::new();

        let slots: [(&str, &mut RuleTable); 13] = [
            ("array_dimension", &mut tables.array_dimension),
            ("array_global", &mut tables.array_global),
            ("class_constant", &mut tables.class_constant),
            ("class_name", &mut tables.class_name),
            ("constant", &mut tables.constant),
            ("constructor_argument", &mut tables.constructor_argument),
            ("annotation", &mut tables.annotation),
            ("function_call", &mut tables.function_call),
            (
                "method_argument_required",
                &mut tables.method_argument_required,
            ),
            ("method_call", &mut tables.method_call),
            ("method_call_static", &mut tables.method_call_static),
            ("property_public", &mut tables.property_public),
            ("scalar_string", &mut tables.scalar_string),
        ];
        for (name, slot) in slots {
            let path = dir.join(format!("{}.json", name));
            if !path.is_file() {
                continue;
            }
            match RuleTable::from_file(&path) {
                Ok(table) => *slot = table,
                Err(error) => issues.push(TableIssue {
                    table: name.to_string(),
                    error,
                }),
            }
        }
        Ok((tables, issues))
    }

    fn all_tables(&self) -> [&RuleTable; 13] {
        [
            &self.array_dimension,
            &self.array_global,
            &self.class_constant,
            &self.class_name,
            &self.constant,
            &self.constructor_argument,
            &self.annotation,
            &self.function_call,
            &self.method_argument_required,
            &self.method_call,
            &self.method_call_static,
            &self.property_public,
            &self.scalar_string,
        ]
    }
}

/// Owns the rule tables of a scan session and builds matcher sets from them
///
/// Tables are loaded once and shared read-only across every file of the
/// session.
pub struct MatcherRegistry {
    tables: MatcherTables,
}

impl MatcherRegistry {
    /// Registry over the built-in tables
    pub fn builtin() -> Result<Self, TableError> {
        Ok(Self {
            tables: MatcherTables::builtin()?,
        })
    }

    /// Registry over built-in tables overridden from a directory
    pub fn from_tables_dir(dir: &Path) -> Result<(Self, Vec<TableIssue>), TableError> {
        let (tables, issues) = MatcherTables::from_dir(dir)?;
        Ok((Self { tables }, issues))
    }

    /// Registry over explicit tables
    pub fn from_tables(tables: MatcherTables) -> Self {
        Self { tables }
    }

    /// All matchers in registration order, borrowing the registry's tables
    pub fn create_set(&self) -> MatcherSet<'_> {
        MatcherSet::new(vec![
            Box::new(ArrayDimensionMatcher::new(&self.tables.array_dimension)),
            Box::new(ArrayGlobalMatcher::new(&self.tables.array_global)),
            Box::new(ClassConstantMatcher::new(&self.tables.class_constant)),
            Box::new(ClassNameMatcher::new(&self.tables.class_name)),
            Box::new(ConstantMatcher::new(&self.tables.constant)),
            Box::new(ConstructorArgumentMatcher::new(
                &self.tables.constructor_argument,
            )),
            Box::new(AnnotationMatcher::new(&self.tables.annotation)),
            Box::new(FunctionCallMatcher::new(&self.tables.function_call)),
            Box::new(MethodArgumentRequiredMatcher::new(
                &self.tables.method_argument_required,
            )),
            Box::new(MethodCallMatcher::new(&self.tables.method_call)),
            Box::new(MethodCallStaticMatcher::new(&self.tables.method_call_static)),
            Box::new(PropertyPublicMatcher::new(&self.tables.property_public)),
            Box::new(ScalarStringMatcher::new(&self.tables.scalar_string)),
        ])
    }

    /// Every changelog filename referenced by any table, for configuration
    /// consistency checks
    pub fn all_changelog_refs(&self) -> BTreeSet<String> {
        let mut refs = BTreeSet::new();
        for table in self.tables.all_tables() {
            for (_, rule) in table.iter() {
                for file in &rule.changelog_files {
                    refs.insert(file.clone());
                }
            }
        }
        refs
    }
}
