//! extscan-core: Core abstractions for the extscan PHP compatibility scanner
//!
//! This crate provides:
//! - `Visitor`: Trait for traversing PHP AST
//! - `Hit`, `Indicator`, `ChangelogEntry`: the match data model
//! - `NameIndex`: namespace/use-alias resolution collected before matching
//! - `FactoryIndex`: resolved class name literals of factory calls
//! - `CodeStatistics`: effective/ignored line accounting and opt-out markers

pub mod factory;
pub mod hit;
pub mod names;
pub mod stats;
pub mod visitor;

pub use factory::{collect_factory_calls, FactoryIndex};
pub use hit::{merge_changelog_refs, ChangelogEntry, Hit, Indicator};
pub use names::{collect_names, parse_use_imports, NameIndex};
pub use stats::CodeStatistics;
pub use visitor::{line_of_offset, visit, Visitor};
