//! Common error types for tunebin

use thiserror::Error;

/// Common result type for tunebin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the catalog, configuration and storage layers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),
}

impl Error {
    /// True for errors a caller should surface as "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
