//! Error types for completion API operations

use thiserror::Error;

/// Result type for completion API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while calling the completion API
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status
    #[error("Completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No API key configured
    #[error("Completion API key not found. Set ANTHROPIC_API_KEY or add it to ~/.config/smart-reviews/secrets.toml")]
    MissingApiKey,

    /// Base URL cannot be used
    #[error("Invalid completion API URL: {0}")]
    InvalidUrl(String),

    /// The response carried no text content
    #[error("Completion response contained no text")]
    EmptyResponse,
}

impl From<Error> for reviews_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::MissingApiKey | Error::InvalidUrl(_) => {
                reviews_core::Error::Config(err.to_string())
            }
            other => reviews_core::Error::Generation(other.to_string()),
        }
    }
}
