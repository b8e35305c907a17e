//! HTML parsing error types

use codecraft_dom::DomError;
use thiserror::Error;

/// HTML parsing result type
pub type HtmlResult<T> = Result<T, HtmlError>;

/// HTML parsing errors
#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("Tree construction failed: {0}")]
    Dom(#[from] DomError),
}
