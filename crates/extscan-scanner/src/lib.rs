//! extscan-scanner: The per-file scan pipeline of the extscan compatibility
//! scanner
//!
//! Ties together the sandboxed source loader, the PHP parser, the stage-1
//! index collection, the single-pass matcher traversal and the changelog
//! cross-reference resolution into one `Scanner` API.

pub mod changelog;
pub mod logging;
pub mod output;
pub mod report;
pub mod sandbox;
pub mod scanner;

pub use changelog::{ChangelogError, ChangelogResolver};
pub use report::ScanResult;
pub use scanner::{RefIssue, ScanError, Scanner, ScannerOptions, DEFAULT_FACTORY_METHOD};
