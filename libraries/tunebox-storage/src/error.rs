/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// A stored document could not be read or written as JSON
    #[error("Serialization error for '{key}': {reason}")]
    Serialization { key: String, reason: String },

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a serialization error for a document key
    pub fn serialization(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Serialization {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<StorageError> for tunebox_core::CoreError {
    fn from(err: StorageError) -> Self {
        tunebox_core::CoreError::storage(err.to_string())
    }
}
