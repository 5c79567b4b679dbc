//! Error types for the storage boundary.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with the given id exists in the collection.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// A document with the given id already exists in the collection.
    #[error("duplicate document: {0}")]
    DuplicateDocument(String),

    /// A query referenced a path no document can satisfy.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
