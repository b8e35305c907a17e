//! Playground error types

use codecraft_html::HtmlError;
use thiserror::Error;

/// Playground result type
pub type PlaygroundResult<T> = Result<T, PlaygroundError>;

/// Errors from color input parsing, level loading and quiz setup
#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("Invalid {channel} channel '{value}': expected an integer from 0 to 255")]
    InvalidChannel { channel: &'static str, value: String },

    #[error("Invalid level data: {0}")]
    LevelData(#[from] serde_json::Error),

    #[error("Level set is empty")]
    NoLevels,

    #[error("Level {level} markup could not be parsed: {source}")]
    Markup {
        level: usize,
        #[source]
        source: HtmlError,
    },
}
