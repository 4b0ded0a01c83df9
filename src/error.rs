//! Error types for satchel.

use thiserror::Error;

/// Common error type for satchel.
#[derive(Error, Debug)]
pub enum SatchelError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for client-supplied input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] crate::template::TemplateError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for satchel operations.
pub type Result<T> = std::result::Result<T, SatchelError>;
