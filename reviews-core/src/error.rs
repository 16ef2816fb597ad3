//! Error types for Smart Reviews

use thiserror::Error;

/// Result type alias for Smart Reviews operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Smart Reviews operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A product or review required by a lookup does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence read or write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Completion service failed or returned an unusable result
    #[error("Generation error: {0}")]
    Generation(String),

    /// Submitted review failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
