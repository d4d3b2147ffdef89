//! Error types for keel-core

use thiserror::Error;

/// Result type alias using keel-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in keel-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local store error
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote collection API error
    #[error("Remote error: {0}")]
    Remote(String),
}
