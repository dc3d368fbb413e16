//! Storage error types

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Node id already exists: {0}")]
    DuplicateId(String),

    #[error("Connection {from} -> {to} references missing node: {missing}")]
    DanglingReference {
        from: String,
        to: String,
        missing: String,
    },

    #[error(transparent)]
    Invalid(#[from] taxigraph_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[cfg(feature = "redb")]
    #[error("ReDB error: {0}")]
    Redb(#[from] ::redb::Error),

    #[cfg(feature = "redb")]
    #[error("ReDB database error: {0}")]
    RedbDatabase(#[from] ::redb::DatabaseError),

    #[cfg(feature = "redb")]
    #[error("ReDB table error: {0}")]
    RedbTable(#[from] ::redb::TableError),

    #[cfg(feature = "redb")]
    #[error("ReDB storage error: {0}")]
    RedbStorage(#[from] ::redb::StorageError),

    #[cfg(feature = "redb")]
    #[error("ReDB commit error: {0}")]
    RedbCommit(#[from] ::redb::CommitError),

    #[cfg(feature = "redb")]
    #[error("ReDB transaction error: {0}")]
    RedbTransaction(#[from] ::redb::TransactionError),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] ::rusqlite::Error),
}

impl StorageError {
    pub(crate) fn lock<E: std::fmt::Display>(e: E) -> Self {
        Self::Database(format!("Lock error: {}", e))
    }

    /// The store could not be reached or opened at all
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Io(_) => true,
            #[cfg(feature = "redb")]
            Self::RedbDatabase(_) => true,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(::rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                ::rusqlite::ErrorCode::CannotOpen
                    | ::rusqlite::ErrorCode::DatabaseBusy
                    | ::rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl From<StorageError> for taxigraph_core::Error {
    fn from(err: StorageError) -> Self {
        use taxigraph_core::Error;

        if err.is_unavailable() {
            return Error::StoreUnavailable(err.to_string());
        }
        match err {
            StorageError::DuplicateId(id) => Error::DuplicateId(id),
            StorageError::DanglingReference { from, to, missing } => {
                Error::DanglingReference { from, to, missing }
            }
            StorageError::Invalid(inner) => inner,
            StorageError::Serialization(e) => Error::Serialization(e),
            other => Error::Storage(other.to_string()),
        }
    }
}
