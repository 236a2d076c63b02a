//! Error types for object store operations.

use std::io;
use thiserror::Error;

/// Result type for object store operations.
pub type Result<T> = std::result::Result<T, BlobError>;

/// Errors that can occur while storing or reading objects.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BlobError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt object {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<sqlx::Error> for BlobError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                BlobError::Unavailable(err.to_string())
            }
            sqlx::Error::Io(e) => BlobError::Unavailable(e.to_string()),
            sqlx::Error::Tls(e) => BlobError::Unavailable(e.to_string()),
            other => BlobError::Database(other.to_string()),
        }
    }
}

impl BlobError {
    pub(crate) fn corrupt(id: &str, reason: impl Into<String>) -> Self {
        BlobError::Corrupt {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error means the object does not exist.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound(_))
    }

    /// Check if the backing store could not be reached.
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BlobError::Unavailable(_))
    }
}
