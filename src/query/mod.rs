//! Searcher algebra and query planning
//!
//! - `searcher`: predicate trees and their evaluation
//! - `path`: the property path selector used by `PropertyEq`
//! - `planner`: static narrowing of searchers to candidate types

pub mod path;
pub mod planner;
pub mod searcher;

pub use path::PropertyPath;
pub use planner::{types_of, TypePlan};
pub use searcher::{
    filter, filter_with, matches, matches_with, BuiltinExtensions, ExtensionEvaluator, Matcher,
    Searcher, Which, ADJACENCY,
};
