//! Store-specific error types
//!
//! Errors raised by the document store (connection, queries, JSON codec).

use thiserror::Error;

/// Errors that can occur while talking to the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connecting to or creating the database failed
    #[error("Failed to connect to document store: {0}")]
    Connection(String),

    /// Running the schema migration failed
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A query against the store failed
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A document could not be encoded or decoded as JSON
    #[error("Invalid document: {0}")]
    Codec(#[from] serde_json::Error),

    /// Document is missing its `id` field
    #[error("Document has no string `id` field")]
    MissingId,

    /// Field name contains characters that are not allowed in a JSON path
    #[error("Invalid field name: {0}")]
    InvalidField(String),
}
