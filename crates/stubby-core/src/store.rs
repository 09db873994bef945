use crate::error::StorageError;
use crate::mapping::{NewUrlMapping, UrlMapping};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Result of an atomic insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The mapping was created.
    Inserted(UrlMapping),
    /// Another mapping already owns this original URL.
    OriginalUrlTaken,
    /// Another mapping already owns this short code.
    ShortCodeTaken,
}

/// Persistent store of URL mappings.
///
/// Both `original_url` and `short_code` are unique keys. Implementations
/// must make [`insert_if_absent`](UrlStore::insert_if_absent) and
/// [`increment_access_count`](UrlStore::increment_access_count) atomic
/// with respect to concurrent callers.
#[async_trait]
pub trait UrlStore: Send + Sync + 'static {
    /// Looks up the mapping owning `original_url`.
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>>;

    /// Looks up the mapping owning `code`.
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Creates the mapping unless one of its unique keys is already taken.
    ///
    /// When both keys are taken, `OriginalUrlTaken` is reported.
    async fn insert_if_absent(&self, mapping: NewUrlMapping) -> Result<InsertOutcome>;

    /// Atomically adds one to the access count of `code`.
    /// Returns the updated mapping, or `None` if the code does not exist.
    async fn increment_access_count(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Returns up to `limit` mappings ordered by id, skipping the first `offset`.
    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<UrlMapping>>;

    /// Total number of stored mappings.
    async fn count(&self) -> Result<u64>;
}
