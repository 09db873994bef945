use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use stubby_core::store::Result;
use stubby_core::{InsertOutcome, NewUrlMapping, ShortCode, UrlMapping, UrlStore};
use tracing::trace;

/// In-memory implementation of [`UrlStore`] using DashMap.
///
/// Records live in a map keyed by short code; a second map indexes them by
/// original URL. Inserts lock the original-URL slot first and the short-code
/// slot second, and no other operation holds both, so the two unique keys
/// are claimed atomically without lock-order inversions.
#[derive(Debug)]
pub struct InMemoryUrlStore {
    by_short_code: DashMap<ShortCode, UrlMapping>,
    by_original_url: DashMap<String, ShortCode>,
    next_id: AtomicU64,
}

impl InMemoryUrlStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new in-memory store with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_short_code: DashMap::with_capacity(capacity),
            by_original_url: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.by_short_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_short_code.is_empty()
    }
}

impl Default for InMemoryUrlStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlStore for InMemoryUrlStore {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let Some(code) = self
            .by_original_url
            .get(original_url)
            .map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };

        Ok(self
            .by_short_code
            .get(&code)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self
            .by_short_code
            .get(code)
            .map(|entry| entry.value().clone()))
    }

    async fn insert_if_absent(&self, mapping: NewUrlMapping) -> Result<InsertOutcome> {
        let NewUrlMapping {
            original_url,
            short_code,
        } = mapping;

        let url_slot = match self.by_original_url.entry(original_url.clone()) {
            Entry::Occupied(_) => {
                trace!(code = %short_code, "original url already mapped");
                return Ok(InsertOutcome::OriginalUrlTaken);
            }
            Entry::Vacant(slot) => slot,
        };

        let code_slot = match self.by_short_code.entry(short_code.clone()) {
            Entry::Occupied(_) => {
                trace!(code = %short_code, "short code already taken");
                return Ok(InsertOutcome::ShortCodeTaken);
            }
            Entry::Vacant(slot) => slot,
        };

        let record = UrlMapping {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            original_url,
            short_code: short_code.clone(),
            access_count: 0,
        };

        code_slot.insert(record.clone());
        url_slot.insert(short_code);

        Ok(InsertOutcome::Inserted(record))
    }

    async fn increment_access_count(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self.by_short_code.get_mut(code).map(|mut entry| {
            entry.value_mut().access_count += 1;
            entry.value().clone()
        }))
    }

    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<UrlMapping>> {
        let mut records: Vec<UrlMapping> = self
            .by_short_code
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_unstable_by_key(|record| record.id);

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(records.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.by_short_code.len() as u64)
    }
}
