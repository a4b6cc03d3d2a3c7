//! Factory call resolution
//!
//! Calls to a configured "instantiate by class name" factory, e.g.
//! `GeneralUtility::makeInstance('Acme\\Cms\\Registry')`, carry a class
//! identity in their literal first argument. This pass resolves those
//! literals to fully qualified class names, so class-identity matchers can
//! treat the call like a direct `new` expression. Non-literal arguments are
//! left unannotated; matchers simply find no entry for them.
//!
//! Runs after name collection, because the factory class reference itself may
//! be shortened or aliased.

use std::collections::HashMap;

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::names::NameIndex;
use crate::visitor::{visit, Visitor};

/// Annotations produced by the factory resolution pass, keyed by the span
/// start of the resolved string literal
#[derive(Debug, Default)]
pub struct FactoryIndex {
    by_literal_offset: HashMap<usize, String>,
}

impl FactoryIndex {
    /// Resolved class name for the string literal starting at `offset`, if
    /// that literal was the first argument of a factory call
    pub fn class_for_literal(&self, offset: usize) -> Option<&str> {
        self.by_literal_offset.get(&offset).map(|s| s.as_str())
    }
}

/// Collect factory call annotations for one parsed file
pub fn collect_factory_calls(
    program: &Program<'_>,
    source: &str,
    names: &NameIndex,
    factory_methods: &[String],
) -> FactoryIndex {
    if factory_methods.is_empty() {
        return FactoryIndex::default();
    }
    let mut collector = FactoryCollector {
        source,
        names,
        factory_methods,
        index: FactoryIndex::default(),
    };
    visit(&mut collector, program, source);
    collector.index
}

struct FactoryCollector<'s> {
    source: &'s str,
    names: &'s NameIndex,
    factory_methods: &'s [String],
    index: FactoryIndex,
}

impl<'s> FactoryCollector<'s> {
    fn get_text(&self, span: mago_span::Span) -> &str {
        &self.source[span.start.offset as usize..span.end.offset as usize]
    }
}

impl<'a, 's> Visitor<'a> for FactoryCollector<'s> {
    fn visit_expression(&mut self, expr: &Expression<'a>, _source: &str) -> bool {
        let Expression::Call(Call::StaticMethod(static_call)) = expr else {
            return true;
        };
        let Expression::Identifier(class_ident) = &*static_call.class else {
            return true;
        };
        let ClassLikeMemberSelector::Identifier(method_ident) = &static_call.method else {
            return true;
        };

        let class_span = class_ident.span();
        let class_name = self
            .names
            .resolve(self.get_text(class_span), class_span.start.offset as usize);
        let method_name = self.get_text(method_ident.span());
        let call_key = format!("{}::{}", class_name, method_name);
        if !self.factory_methods.iter().any(|f| f == &call_key) {
            return true;
        }

        let Some(first) = static_call.argument_list.arguments.iter().next() else {
            return true;
        };
        let Expression::Literal(Literal::String(string_lit)) = first.value() else {
            return true;
        };

        let lit_span = string_lit.span();
        let full_text = self.get_text(lit_span);
        let quote = full_text.chars().next().unwrap_or('"');
        if quote != '\'' && quote != '"' || full_text.len() < 2 {
            return true;
        }
        let value = &full_text[1..full_text.len() - 1];
        let class = NameIndex::normalize_class_string(value);
        if class.is_empty() {
            return true;
        }

        let literal_offset = lit_span.start.offset as usize;
        self.index.by_literal_offset.insert(literal_offset, class);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::collect_names;
    use bumpalo::Bump;
    use mago_database::file::FileId;

    fn collect(source: &str) -> FactoryIndex {
        let arena = Bump::new();
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, source);
        let names = collect_names(program, source);
        let factories = vec!["Acme\\Cms\\Utility\\GeneralUtility::makeInstance".to_string()];
        collect_factory_calls(program, source, &names, &factories)
    }

    #[test]
    fn test_literal_argument_is_resolved() {
        let source = r#"<?php
$obj = \Acme\Cms\Utility\GeneralUtility::makeInstance('Vendor\\Ext\\Service');
"#;
        let index = collect(source);
        let offset = source.find("'Vendor").unwrap();
        assert_eq!(index.class_for_literal(offset), Some("Vendor\\Ext\\Service"));
    }

    #[test]
    fn test_shortened_factory_reference_is_resolved() {
        let source = r#"<?php
use Acme\Cms\Utility\GeneralUtility;
$obj = GeneralUtility::makeInstance('Vendor\\Ext\\Service', $a, $b);
"#;
        let index = collect(source);
        let offset = source.find("'Vendor").unwrap();
        assert_eq!(index.class_for_literal(offset), Some("Vendor\\Ext\\Service"));
    }

    #[test]
    fn test_variable_argument_is_not_annotated() {
        let source = r#"<?php
$obj = \Acme\Cms\Utility\GeneralUtility::makeInstance($className);
"#;
        let index = collect(source);
        let offset = source.find("$className").unwrap();
        assert!(index.class_for_literal(offset).is_none());
    }

    #[test]
    fn test_unrelated_static_call_is_not_annotated() {
        let source = r#"<?php
$obj = \Other\Factory::makeInstance('Vendor\\Ext\\Service');
"#;
        let index = collect(source);
        let offset = source.find("'Vendor").unwrap();
        assert!(index.class_for_literal(offset).is_none());
    }
}
