//! DOM error types

use thiserror::Error;

/// DOM operation result type
pub type DomResult<T> = Result<T, DomError>;

/// DOM errors
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Cannot append {child} to itself or one of its descendants")]
    HierarchyCycle { child: u32 },

    #[error("Node {0} cannot have children")]
    NotAContainer(u32),
}
