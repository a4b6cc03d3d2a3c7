//! The per-file scan pipeline
//!
//! Stage 1 collects the name index, factory annotations and line
//! statistics; stage 2 runs all matchers over a single traversal. The
//! aggregation step assigns unique ids, re-reads the file for literal line
//! content and resolves changelog references, isolating each failed
//! reference into the hit's unresolved list.

use std::fs;
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use extscan_core::{collect_factory_calls, collect_names, CodeStatistics};
use extscan_matchers::{MatchContext, MatcherRegistry, TableError};
use mago_database::file::FileId;
use thiserror::Error;

use crate::changelog::{ChangelogError, ChangelogResolver};
use crate::logging;
use crate::report::ScanResult;
use crate::sandbox;

/// Default "instantiate by class name" factory recognized by the factory
/// resolution pass
pub const DEFAULT_FACTORY_METHOD: &str = "Cms\\Core\\Utility\\GeneralUtility::makeInstance";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path is outside the allowed extension directory or not a file: {0}")]
    PathNotAllowed(PathBuf),

    #[error("file cannot be scanned: {0}")]
    Syntax(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("no changelog root configured")]
    ChangelogRootRequired,
}

/// Scan session configuration
#[derive(Debug, Clone)]
pub struct ScannerOptions {
    /// Root of the changelog documentation tree; without it, hits carry
    /// unresolved references only
    pub changelog_root: Option<PathBuf>,
    /// Static factory methods whose literal first argument is a class name,
    /// as `Fqcn::method` keys
    pub factory_methods: Vec<String>,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            changelog_root: None,
            factory_methods: vec![DEFAULT_FACTORY_METHOD.to_string()],
        }
    }
}

/// A reference in a rule table that does not resolve to exactly one
/// changelog document
#[derive(Debug)]
pub struct RefIssue {
    pub filename: String,
    pub error: ChangelogError,
}

/// One scan session: rule tables loaded once, shared across all files
pub struct Scanner {
    registry: MatcherRegistry,
    options: ScannerOptions,
}

impl Scanner {
    pub fn new(registry: MatcherRegistry, options: ScannerOptions) -> Self {
        Self { registry, options }
    }

    /// Scanner over the built-in rule tables
    pub fn with_builtin_tables(options: ScannerOptions) -> Result<Self, ScanError> {
        Ok(Self::new(MatcherRegistry::builtin()?, options))
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    /// Scan one file of an extension, given its root and a relative path
    ///
    /// The sandbox check runs on every call; both inputs are
    /// attacker-influenced in the original system.
    pub fn scan_extension_file(
        &self,
        extension_root: &Path,
        relative: &Path,
    ) -> Result<ScanResult, ScanError> {
        let path = sandbox::resolve_in_root(extension_root, relative)?;
        self.scan_file(&path)
    }

    /// Scan a file by absolute or cwd-relative path, without the sandbox
    pub fn scan_file(&self, path: &Path) -> Result<ScanResult, ScanError> {
        logging::log_scan_start(path);
        let source = fs::read_to_string(path)?;
        let result = self.scan(&source, Some(path))?;
        logging::log_scan_result(path, result.hits.len(), result.is_file_ignored);
        Ok(result)
    }

    /// Scan in-memory source, used by tests and embedding callers
    pub fn scan_source(&self, source: &str) -> Result<ScanResult, ScanError> {
        self.scan(source, None)
    }

    fn scan(&self, source: &str, path: Option<&Path>) -> Result<ScanResult, ScanError> {
        let arena = Bump::new();
        let name = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "source.php".to_string());
        let file_id = FileId::new(&name);
        let (program, parse_error) =
            mago_syntax::parser::parse_file_content(&arena, file_id, source);
        if let Some(error) = parse_error {
            return Err(ScanError::Syntax(error.to_string()));
        }

        // Stage 1 runs to completion before any matcher; class-identity
        // matching requires every reference already canonicalized
        let names = collect_names(program, source);
        let factories =
            collect_factory_calls(program, source, &names, &self.options.factory_methods);
        let stats = CodeStatistics::analyze(source);

        // Stage 2: one traversal for all matchers
        let ctx = MatchContext {
            source,
            names: &names,
            factories: &factories,
        };
        let mut set = self.registry.create_set();
        let mut hits = set.run(program, &ctx, &stats);

        // Aggregation: ids, literal line content from a second independent
        // read, changelog resolution isolated per reference
        let line_source = match path {
            Some(p) => fs::read_to_string(p).unwrap_or_else(|_| source.to_string()),
            None => source.to_string(),
        };
        let mut resolver = self
            .options
            .changelog_root
            .as_ref()
            .map(ChangelogResolver::new);

        let mut ref_seq = 0usize;
        for (index, hit) in hits.iter_mut().enumerate() {
            hit.unique_id = format!("hit-{}", index + 1);
            hit.line_content = line_source
                .lines()
                .nth(hit.line.saturating_sub(1))
                .map(|l| l.trim().to_string())
                .unwrap_or_default();

            let Some(resolver) = resolver.as_mut() else {
                continue;
            };
            for filename in hit.changelog_refs.clone() {
                match resolver.resolve(&filename) {
                    Ok(mut entry) => {
                        ref_seq += 1;
                        entry.unique_id = format!("ref-{}", ref_seq);
                        hit.changelog_entries.push(entry);
                    }
                    Err(error) => {
                        logging::log(&format!(
                            "changelog reference \"{}\" failed to resolve: {}",
                            filename, error
                        ));
                        hit.unresolved_refs.push(filename);
                    }
                }
            }
        }

        Ok(ScanResult {
            hits,
            is_file_ignored: stats.is_file_ignored,
            effective_code_lines: stats.effective_code_lines,
            ignored_lines: stats.ignored_lines,
        })
    }

    /// Configuration consistency check: every changelog reference of every
    /// rule table must resolve to exactly one document
    pub fn validate_tables(&self) -> Result<Vec<RefIssue>, ScanError> {
        let root = self
            .options
            .changelog_root
            .as_ref()
            .ok_or(ScanError::ChangelogRootRequired)?;
        let mut resolver = ChangelogResolver::new(root);

        let mut issues = Vec::new();
        for filename in self.registry.all_changelog_refs() {
            if let Err(error) = resolver.resolve(&filename) {
                issues.push(RefIssue { filename, error });
            }
        }
        Ok(issues)
    }
}
