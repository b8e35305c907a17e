//! CodeCraft CSS - selector syntax
//!
//! A CSS tokenizer and a Selectors Level 4 parser covering what
//! `querySelector` accepts in practice: compound selectors, the four
//! combinators, attribute operators, and structural pseudo-classes.

mod error;
mod nth;
mod selector;
mod tokenizer;

pub use error::{CssError, CssResult, SourceLocation};
pub use nth::NthExpr;
pub use selector::{
    AttributeOp, Combinator, PseudoArg, Selector, SelectorList, SelectorPart, Specificity,
};
pub use tokenizer::{HashType, Token, Tokenizer};
