//! Namespace and use-alias resolution
//!
//! The scan pipeline collects a `NameIndex` in a full first traversal, so
//! every later pass sees canonical fully qualified class names. Matching is
//! exact-string lookup against configured symbol tables, so shortened and
//! aliased references must be rewritten to their fully qualified form before
//! any matcher runs.

use std::collections::HashMap;

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::visitor::{visit, Visitor};

/// One namespace block (or the file-level scope) with its use aliases
#[derive(Debug, Clone)]
struct NamespaceScope {
    start: usize,
    end: usize,
    namespace: Option<String>,
    /// alias -> fully qualified name; lookup is case-insensitive per PHP
    aliases: HashMap<String, String>,
}

/// Per-file class name resolution table
///
/// Immutable once collected; stage 2 of the pipeline only reads it.
#[derive(Debug, Clone)]
pub struct NameIndex {
    scopes: Vec<NamespaceScope>,
}

impl NameIndex {
    fn for_source_len(len: usize) -> Self {
        Self {
            scopes: vec![NamespaceScope {
                start: 0,
                end: len,
                namespace: None,
                aliases: HashMap::new(),
            }],
        }
    }

    /// Resolve a raw class reference written at `offset` to a fully
    /// qualified name (without leading backslash)
    pub fn resolve(&self, raw: &str, offset: usize) -> String {
        let raw = raw.trim();
        if let Some(stripped) = raw.strip_prefix('\\') {
            return stripped.to_string();
        }

        let scope = self.scope_at(offset);
        let first_segment = raw.split('\\').next().unwrap_or(raw);
        let first_lower = first_segment.to_lowercase();

        for (alias, fqcn) in &scope.aliases {
            if alias.to_lowercase() == first_lower {
                let rest = &raw[first_segment.len()..];
                return format!("{}{}", fqcn, rest);
            }
        }

        match &scope.namespace {
            Some(ns) => format!("{}\\{}", ns, raw),
            None => raw.to_string(),
        }
    }

    /// Normalize a class name written as a PHP string literal value, e.g.
    /// `'Acme\\Cms\\Registry'` or `'\Acme\Cms\Registry'`
    pub fn normalize_class_string(value: &str) -> String {
        value.replace("\\\\", "\\").trim_start_matches('\\').to_string()
    }

    fn scope_at(&self, offset: usize) -> &NamespaceScope {
        // Innermost scope containing the offset; the file scope at index 0
        // always matches
        self.scopes
            .iter()
            .filter(|s| s.start <= offset && offset < s.end)
            .last()
            .unwrap_or(&self.scopes[0])
    }

    fn add_namespace(&mut self, start: usize, end: usize, namespace: Option<String>) {
        self.scopes.push(NamespaceScope {
            start,
            end,
            namespace,
            aliases: HashMap::new(),
        });
    }

    fn add_alias(&mut self, offset: usize, alias: String, fqcn: String) {
        // Attach to the innermost scope containing the use statement
        let idx = self
            .scopes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.start <= offset && offset < s.end)
            .map(|(i, _)| i)
            .last()
            .unwrap_or(0);
        self.scopes[idx].aliases.insert(alias, fqcn);
    }
}

/// Parse the literal text of a use statement into `(alias, fully qualified
/// name)` pairs
///
/// Handles `use A\B;`, `use A\B as C;`, comma lists and grouped imports
/// `use A\{B, C as D};`. Function and constant imports are not class
/// identities and yield nothing.
/// Byte position of the ` as ` keyword, matched ASCII-case-insensitively
/// without re-mapping offsets through a lowercased copy
fn find_as_keyword(item: &str) -> Option<usize> {
    item.as_bytes().windows(4).position(|w| {
        w[0] == b' '
            && w[1].eq_ignore_ascii_case(&b'a')
            && w[2].eq_ignore_ascii_case(&b's')
            && w[3] == b' '
    })
}

pub fn parse_use_imports(use_text: &str) -> Vec<(String, String)> {
    let mut imports = Vec::new();
    let text = use_text
        .trim_start_matches("use")
        .trim()
        .trim_end_matches(';')
        .trim();

    if text.starts_with("function ") || text.starts_with("const ") {
        return imports;
    }

    let mut push_item = |item: &str, prefix: Option<&str>| {
        let qualify = |name: &str| match prefix {
            Some(p) if !p.is_empty() => format!("{}\\{}", p, name),
            _ => name.to_string(),
        };
        if let Some(as_pos) = find_as_keyword(item) {
            let name = item[..as_pos].trim();
            let alias = item[as_pos + 4..].trim();
            imports.push((
                alias.to_string(),
                qualify(name).trim_start_matches('\\').to_string(),
            ));
        } else {
            let alias = item.rsplit('\\').next().unwrap_or(item);
            imports.push((
                alias.to_string(),
                qualify(item).trim_start_matches('\\').to_string(),
            ));
        }
    };

    // Grouped imports: Foo\{Bar, Baz as Qux}
    if let Some(brace_start) = text.find('{') {
        if let Some(brace_end) = text.find('}') {
            let prefix = text[..brace_start].trim().trim_end_matches('\\');
            for item in text[brace_start + 1..brace_end].split(',') {
                let item = item.trim();
                if item.is_empty() || item.starts_with("function ") || item.starts_with("const ") {
                    continue;
                }
                push_item(item, Some(prefix));
            }
            return imports;
        }
    }

    for item in text.split(',') {
        let item = item.trim();
        if !item.is_empty() {
            push_item(item, None);
        }
    }
    imports
}

/// Collect the `NameIndex` for one parsed file
///
/// Runs to completion over the entire tree before any matcher pass; later
/// passes require every class reference already canonicalized.
pub fn collect_names(program: &Program<'_>, source: &str) -> NameIndex {
    let mut collector = NameCollector {
        source,
        index: NameIndex::for_source_len(source.len()),
    };
    visit(&mut collector, program, source);
    collector.index
}

struct NameCollector<'s> {
    source: &'s str,
    index: NameIndex,
}

impl<'s> NameCollector<'s> {
    fn get_text(&self, span: mago_span::Span) -> &str {
        &self.source[span.start.offset as usize..span.end.offset as usize]
    }
}

impl<'a, 's> Visitor<'a> for NameCollector<'s> {
    fn visit_statement(&mut self, stmt: &Statement<'a>, _source: &str) -> bool {
        match stmt {
            Statement::Namespace(ns) => {
                let span = ns.span();
                let ns_text = self.get_text(span);
                let mut namespace = None;
                if let Some(keyword_pos) = ns_text.find("namespace") {
                    let after_keyword = &ns_text[keyword_pos + 9..];
                    let name_end = after_keyword
                        .find(|c: char| c == '{' || c == ';')
                        .unwrap_or(after_keyword.len());
                    let name = after_keyword[..name_end].trim();
                    if !name.is_empty() {
                        namespace = Some(name.to_string());
                    }
                }
                self.index.add_namespace(
                    span.start.offset as usize,
                    span.end.offset as usize,
                    namespace,
                );
                true
            }
            Statement::Use(use_stmt) => {
                let span = use_stmt.span();
                let use_text = self.get_text(span).to_string();
                for (alias, fqcn) in parse_use_imports(&use_text) {
                    self.index.add_alias(span.start.offset as usize, alias, fqcn);
                }
                true
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use mago_database::file::FileId;

    fn index_for(source: &str) -> NameIndex {
        let arena = Bump::new();
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, source);
        collect_names(program, source)
    }

    #[test]
    fn test_fully_qualified_reference_keeps_name() {
        let index = index_for("<?php\n$x = new \\Acme\\Cms\\Registry();\n");
        assert_eq!(
            index.resolve("\\Acme\\Cms\\Registry", 10),
            "Acme\\Cms\\Registry"
        );
    }

    #[test]
    fn test_use_import_resolves_short_name() {
        let source = "<?php\nuse Acme\\Cms\\Registry;\n$x = new Registry();\n";
        let index = index_for(source);
        let offset = source.find("new Registry").unwrap();
        assert_eq!(index.resolve("Registry", offset), "Acme\\Cms\\Registry");
    }

    #[test]
    fn test_use_alias_resolves() {
        let source = "<?php\nuse Acme\\Cms\\Registry as Reg;\n$x = new Reg();\n";
        let index = index_for(source);
        let offset = source.find("new Reg").unwrap();
        assert_eq!(index.resolve("Reg", offset), "Acme\\Cms\\Registry");
    }

    #[test]
    fn test_alias_prefix_keeps_trailing_segments() {
        let source = "<?php\nuse Acme\\Cms as Cms;\n$x = new Cms\\Registry();\n";
        let index = index_for(source);
        let offset = source.find("new Cms").unwrap();
        assert_eq!(index.resolve("Cms\\Registry", offset), "Acme\\Cms\\Registry");
    }

    #[test]
    fn test_grouped_import() {
        let source = "<?php\nuse Acme\\Cms\\{Registry, Cache as C};\n$a = new Registry();\n$b = new C();\n";
        let index = index_for(source);
        let offset = source.find("new Registry").unwrap();
        assert_eq!(index.resolve("Registry", offset), "Acme\\Cms\\Registry");
        assert_eq!(index.resolve("C", offset), "Acme\\Cms\\Cache");
    }

    #[test]
    fn test_namespace_qualifies_unimported_names() {
        let source = "<?php\nnamespace Vendor\\Ext;\n$x = new Helper();\n";
        let index = index_for(source);
        let offset = source.find("new Helper").unwrap();
        assert_eq!(index.resolve("Helper", offset), "Vendor\\Ext\\Helper");
    }

    #[test]
    fn test_function_imports_are_skipped() {
        let source = "<?php\nuse function Acme\\Cms\\makeThing;\n$x = makeThing();\n";
        let index = index_for(source);
        let offset = source.find("makeThing()").unwrap();
        assert_eq!(index.resolve("makeThing", offset), "makeThing");
    }

    #[test]
    fn test_uppercase_as_keyword_is_recognized() {
        let imports = parse_use_imports("use Acme\\Cms\\Registry AS Reg;");
        assert_eq!(
            imports,
            vec![("Reg".to_string(), "Acme\\Cms\\Registry".to_string())]
        );
    }

    #[test]
    fn test_non_ascii_import_name_splits_at_the_keyword() {
        // U+0130 changes byte length under Unicode lowercasing; the alias
        // split must not be derived from a lowercased copy
        let imports = parse_use_imports("use Acme\\Cms\\İstanbulHelper as Ist;");
        assert_eq!(
            imports,
            vec![("Ist".to_string(), "Acme\\Cms\\İstanbulHelper".to_string())]
        );
    }

    #[test]
    fn test_normalize_class_string() {
        assert_eq!(
            NameIndex::normalize_class_string("Acme\\\\Cms\\\\Registry"),
            "Acme\\Cms\\Registry"
        );
        assert_eq!(
            NameIndex::normalize_class_string("\\Acme\\Cms\\Registry"),
            "Acme\\Cms\\Registry"
        );
    }
}
