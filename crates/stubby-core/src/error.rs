use thiserror::Error;

/// Errors related to the core domain types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Failures of a [`UrlStore`](crate::UrlStore) backend.
///
/// Unique-key collisions are not errors; they are reported through
/// [`InsertOutcome`](crate::InsertOutcome).
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Errors surfaced by the shortener operations.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code generation exhausted after {attempts} attempts")]
    RetryLimitExceeded { attempts: u32 },
    #[error("invalid page request: {0}")]
    InvalidPage(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
