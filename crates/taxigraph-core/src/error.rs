//! Error types for Taxigraph Core

use thiserror::Error;

/// Result type alias using Taxigraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Taxigraph error types
///
/// Every write-path failure has its own variant so a producer can decide
/// whether to retry, skip or abort.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node id already exists: {0}")]
    DuplicateId(String),

    #[error("Connection {from} -> {to} references missing node: {missing}")]
    DanglingReference {
        from: String,
        to: String,
        missing: String,
    },

    #[error("{node_type} requires '{field}'")]
    MissingField {
        node_type: &'static str,
        field: &'static str,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Unknown direction: {0}")]
    UnknownDirection(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from the store being unreachable rather than
    /// from the data supplied by the caller.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
