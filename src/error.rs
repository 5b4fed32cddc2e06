use std::io;

use thiserror::Error;

/// Errors raised by the terminal interaction core.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw mode or the alternate screen could not be set up.
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(#[source] io::Error),

    /// Drawing a prompt frame failed.
    #[error("failed to draw prompt: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The filter query is not a valid regular expression.
///
/// Recoverable: the prompt keeps running and shows the error in its status
/// line until the query is edited into a valid pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pattern {query:?}: {message}")]
pub struct PatternError {
    pub query: String,
    pub message: String,
}

impl PatternError {
    pub fn new(query: &str, err: &regex::Error) -> Self {
        Self {
            query: query.to_string(),
            message: err.to_string(),
        }
    }
}
