//! extscan-matchers: Configured pattern matchers for the extscan scanner
//!
//! Each matcher inspects one syntactic category against its own symbol rule
//! table; all matchers of a scan run over a single tree traversal driven by
//! the `MatcherSet`. Modules are listed in matcher-registration order, which
//! also orders the hits in a scan result.

pub mod registry;
pub mod rules;

pub mod array_dimension;
pub mod array_global;
pub mod class_constant;
pub mod class_name;
pub mod constant;
pub mod constructor_argument;
pub mod annotation;
pub mod function_call;
pub mod method_argument_required;
pub mod method_call;
pub mod method_call_static;
pub mod property_public;
pub mod scalar_string;

pub use registry::{
    args_have_spread, MatchContext, Matcher, MatcherRegistry, MatcherSet, MatcherTables, TableIssue,
};
pub use rules::{argument_count_matches, RuleTable, SymbolRule, TableError};
