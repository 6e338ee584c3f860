//! Common error types for bibdb

use thiserror::Error;

/// Common result type for bibdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across bibdb crates
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

    /// The persisted store could not be opened or created
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
