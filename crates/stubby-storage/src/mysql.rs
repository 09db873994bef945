use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use std::time::Duration;
use stubby_core::store::Result;
use stubby_core::{InsertOutcome, NewUrlMapping, ShortCode, StorageError, UrlMapping, UrlStore};
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

/// MySQL implementation of the [`UrlStore`] contract.
///
/// Uniqueness of `original_url` is enforced through a unique index on its
/// SHA-256 digest, since `TEXT` columns cannot carry a full-length unique
/// key. Short codes use a binary collation so that codes differing only
/// in letter case are distinct.
#[derive(Debug, Clone)]
pub struct MySqlUrlStore {
    pool: MySqlPool,
}

impl MySqlUrlStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("url_mappings schema ensured");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn url_digest(original_url: &str) -> Vec<u8> {
    Sha256::digest(original_url.as_bytes()).to_vec()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn mapping_from_row(row: &MySqlRow) -> Result<UrlMapping> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let access_count: u64 = row.try_get("access_count").map_err(map_sqlx_error)?;

    Ok(UrlMapping {
        id,
        original_url,
        short_code: ShortCode::new_unchecked(short_code),
        access_count,
    })
}

#[async_trait]
impl UrlStore for MySqlUrlStore {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_url, short_code, access_count
            FROM url_mappings
            WHERE original_url_hash = ?
              AND original_url = ?
            LIMIT 1
            "#,
        )
        .bind(url_digest(original_url))
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_url, short_code, access_count
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn insert_if_absent(&self, mapping: NewUrlMapping) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (original_url, original_url_hash, short_code, access_count)
            VALUES (?, ?, ?, 0)
            "#,
        )
        .bind(mapping.original_url.as_str())
        .bind(url_digest(&mapping.original_url))
        .bind(mapping.short_code.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(InsertOutcome::Inserted(UrlMapping {
                id: done.last_insert_id(),
                original_url: mapping.original_url,
                short_code: mapping.short_code,
                access_count: 0,
            })),
            Err(err) if is_unique_violation(&err) => {
                // Rows are never deleted, so a committed owner of the
                // original URL is visible here if that key was the one hit.
                trace!(code = %mapping.short_code, error = %err, "unique key violated");
                if self
                    .find_by_original_url(&mapping.original_url)
                    .await?
                    .is_some()
                {
                    Ok(InsertOutcome::OriginalUrlTaken)
                } else {
                    Ok(InsertOutcome::ShortCodeTaken)
                }
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_access_count(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let updated = sqlx::query(
            r#"
            UPDATE url_mappings
            SET access_count = access_count + 1
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(None);
        }

        // The row stays locked by the update until commit, so this read
        // observes exactly our increment.
        let row = sqlx::query(
            r#"
            SELECT id, original_url, short_code, access_count
            FROM url_mappings
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        mapping_from_row(&row).map(Some)
    }

    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<UrlMapping>> {
        let rows = sqlx::query(
            r#"
            SELECT id, original_url, short_code, access_count
            FROM url_mappings
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(mapping_from_row).collect()
    }

    async fn count(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_mappings")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        u64::try_from(total)
            .map_err(|e| StorageError::InvalidData(format!("invalid row count {total}: {e}")))
    }
}
