//! Error types for fieldsync-core

use thiserror::Error;

/// Result type alias using fieldsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldsync-core operations
///
/// `NotFound`, `InvalidState` and `Validation` are caller errors. They are
/// returned as-is and never retried by the core.
#[derive(Error, Debug)]
pub enum Error {
    /// Operation referenced an id absent from the ledger
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Item or session is in a state that forbids the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed input to a mutation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External collaborator (OCR, routing) returned unusable output
    #[error("Collaborator error: {0}")]
    Collaborator(String),
}
