//! CodeCraft HTML - fragment parser
//!
//! Tokenizes small markup snippets and builds them into a fragment tree,
//! the way `innerHTML` assignment does in a browser.

mod tokenizer;
mod tree_builder;
mod error;
mod entities;

pub use tokenizer::{Tokenizer, Token};
pub use tree_builder::{FragmentParser, parse_fragment};
pub use error::{HtmlError, HtmlResult};
