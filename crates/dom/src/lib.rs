//! CodeCraft DOM - fragment document model
//!
//! An in-memory node tree for the small markup snippets the playgrounds
//! query against. Node 0 is the fragment root, the container the markup was
//! parsed into.

mod node;
mod tree;
mod error;
mod query;

pub use node::{Node, NodeId, NodeType, ElementData};
pub use tree::{DomTree, is_void_element};
pub use error::{DomError, DomResult};
pub use query::Queryable;
