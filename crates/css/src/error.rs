//! CSS parsing error types

use std::fmt;
use thiserror::Error;

/// CSS parsing result type
pub type CssResult<T> = Result<T, CssError>;

/// Source location in CSS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// CSS parsing errors
#[derive(Debug, Error, PartialEq)]
pub enum CssError {
    #[error("Empty selector at {location}")]
    EmptySelector {
        location: SourceLocation,
    },

    #[error("Unexpected token {found} at {location}")]
    UnexpectedToken {
        found: String,
        location: SourceLocation,
    },

    #[error("Unexpected end of input at {location}")]
    UnexpectedEof {
        location: SourceLocation,
    },

    #[error("Unknown pseudo-class ':{name}' at {location}")]
    UnknownPseudoClass {
        name: String,
        location: SourceLocation,
    },

    #[error("Invalid argument '{argument}' for ':{name}' at {location}")]
    InvalidArgument {
        name: String,
        argument: String,
        location: SourceLocation,
    },

    #[error("Unterminated string at {location}")]
    UnterminatedString {
        location: SourceLocation,
    },
}

impl CssError {
    /// Get the source location of this error
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::EmptySelector { location } => *location,
            Self::UnexpectedToken { location, .. } => *location,
            Self::UnexpectedEof { location } => *location,
            Self::UnknownPseudoClass { location, .. } => *location,
            Self::InvalidArgument { location, .. } => *location,
            Self::UnterminatedString { location } => *location,
        }
    }

    pub fn unexpected(found: impl fmt::Debug, location: SourceLocation) -> Self {
        Self::UnexpectedToken { found: format!("{:?}", found), location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5, 100);
        assert_eq!(format!("{}", loc), "10:5");
    }

    #[test]
    fn test_error_display() {
        let loc = SourceLocation::new(1, 3, 2);
        let err = CssError::UnknownPseudoClass { name: "hovr".to_string(), location: loc };
        assert_eq!(format!("{}", err), "Unknown pseudo-class ':hovr' at 1:3");
        assert_eq!(err.location(), loc);
    }
}
