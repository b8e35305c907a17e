//! CodeCraft Style - selector matching
//!
//! Matches parsed selectors against fragment elements and answers
//! `querySelector`-style queries.

pub mod matching;
pub mod query;

pub use matching::{matches_any, matches_selector, matches_selector_with_context, MatchingContext};
pub use query::{query_selector, query_selector_all, SelectorQuery};
