use crate::settings::ShortenerSettings;
use async_trait::async_trait;
use std::sync::Arc;
use stubby_core::{
    InsertOutcome, NewUrlMapping, Page, PageRequest, ShortCode, Shortener, ShortenerError,
    StorageError, UrlMapping, UrlStore, MAX_PAGE_SIZE,
};
use stubby_generator::{CodeGenerator, SaltSource, UuidSalt};
use tracing::{debug, info, trace, warn};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `UrlStore`, a `CodeGenerator` and a `SaltSource`
/// to handle:
/// - Idempotent shortening (one mapping per original URL)
/// - Salted regeneration when a short code is already taken
/// - Access counting on resolve
/// - Paged listing
///
/// The first attempt hashes the bare URL. Each retry hashes the URL with a
/// fresh salt appended, but the stored original URL is always the bare one.
#[derive(Debug)]
pub struct ShortenerService<S, G, T = UuidSalt> {
    store: Arc<S>,
    generator: Arc<G>,
    salts: Arc<T>,
    settings: ShortenerSettings,
}

impl<S, G, T> Clone for ShortenerService<S, G, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            salts: Arc::clone(&self.salts),
            settings: self.settings.clone(),
        }
    }
}

impl<S: UrlStore, G: CodeGenerator> ShortenerService<S, G> {
    /// Creates a new `ShortenerService` salting retries with random UUIDs.
    pub fn new(store: S, generator: G) -> Self {
        Self::with_salt_source(store, generator, UuidSalt)
    }
}

impl<S: UrlStore, G: CodeGenerator, T: SaltSource> ShortenerService<S, G, T> {
    /// Creates a new `ShortenerService` with a custom salt source.
    pub fn with_salt_source(store: S, generator: G, salts: T) -> Self {
        Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
            salts: Arc::new(salts),
            settings: ShortenerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ShortenerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up the code of a mapping another writer created concurrently.
    async fn concurrent_winner(&self, original_url: &str) -> Result<ShortCode, ShortenerError> {
        match self.store.find_by_original_url(original_url).await? {
            Some(existing) => {
                debug!(code = %existing.short_code, "original url claimed by a concurrent writer");
                Ok(existing.short_code)
            }
            // Rows are never deleted, so a reported owner must be readable.
            None => Err(ShortenerError::Storage(StorageError::InvalidData(
                "original url reported taken but no mapping was found".to_string(),
            ))),
        }
    }
}

#[async_trait]
impl<S: UrlStore, G: CodeGenerator, T: SaltSource> Shortener for ShortenerService<S, G, T> {
    async fn shorten(&self, original_url: &str) -> Result<ShortCode, ShortenerError> {
        if let Some(existing) = self.store.find_by_original_url(original_url).await? {
            trace!(code = %existing.short_code, "original url already shortened");
            return Ok(existing.short_code);
        }

        let max_attempts = self.settings.max_attempts();
        let mut candidate = self.generator.generate(original_url);

        for attempt in 1..=max_attempts {
            let mapping = NewUrlMapping::new(original_url, candidate.clone());

            match self.store.insert_if_absent(mapping).await? {
                InsertOutcome::Inserted(record) => {
                    info!(code = %record.short_code, attempt, "short url created");
                    return Ok(record.short_code);
                }
                InsertOutcome::OriginalUrlTaken => {
                    return self.concurrent_winner(original_url).await;
                }
                InsertOutcome::ShortCodeTaken => {
                    debug!(code = %candidate, attempt, "short code collision");
                    if attempt < max_attempts {
                        let salt = self.salts.salt();
                        candidate = self.generator.generate_salted(original_url, &salt);
                    }
                }
            }
        }

        warn!(attempts = max_attempts, "short code generation exhausted");
        Err(ShortenerError::RetryLimitExceeded {
            attempts: max_attempts,
        })
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String, ShortenerError> {
        if self.store.find_by_short_code(code).await?.is_none() {
            trace!(code = %code, "short code not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        let record = self
            .store
            .increment_access_count(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        trace!(code = %code, access_count = record.access_count, "short code resolved");
        Ok(record.original_url)
    }

    async fn list(&self, request: PageRequest) -> Result<Page<UrlMapping>, ShortenerError> {
        if request.page_size == 0 || request.page_size > MAX_PAGE_SIZE {
            return Err(ShortenerError::InvalidPage(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                request.page_size
            )));
        }

        let offset = request.checked_offset().ok_or_else(|| {
            ShortenerError::InvalidPage(format!("page {} is out of range", request.page_number))
        })?;

        let items = self.store.page(offset, request.page_size).await?;
        let total_items = self.store.count().await?;

        Ok(Page {
            items,
            page_number: request.page_number,
            page_size: request.page_size,
            total_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
    use stubby_core::store::Result as StoreResult;
    use stubby_generator::HashCodeGenerator;
    use stubby_storage::InMemoryUrlStore;

    /// Delegates to the in-memory store, counting inserts and optionally
    /// hiding the first original-URL lookup to simulate a lost race.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryUrlStore,
        inserts: AtomicU32,
        hide_first_lookup: AtomicBool,
    }

    impl CountingStore {
        fn inserts(&self) -> u32 {
            self.inserts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UrlStore for CountingStore {
        async fn find_by_original_url(&self, original_url: &str) -> StoreResult<Option<UrlMapping>> {
            if self.hide_first_lookup.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_original_url(original_url).await
        }

        async fn find_by_short_code(&self, code: &ShortCode) -> StoreResult<Option<UrlMapping>> {
            self.inner.find_by_short_code(code).await
        }

        async fn insert_if_absent(&self, mapping: NewUrlMapping) -> StoreResult<InsertOutcome> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert_if_absent(mapping).await
        }

        async fn increment_access_count(&self, code: &ShortCode) -> StoreResult<Option<UrlMapping>> {
            self.inner.increment_access_count(code).await
        }

        async fn page(&self, offset: u64, limit: u64) -> StoreResult<Vec<UrlMapping>> {
            self.inner.page(offset, limit).await
        }

        async fn count(&self) -> StoreResult<u64> {
            self.inner.count().await
        }
    }

    /// Produces the same code for every input, salted or not.
    struct FixedGenerator(&'static str);

    impl CodeGenerator for FixedGenerator {
        fn generate(&self, _input: &str) -> ShortCode {
            ShortCode::new_unchecked(self.0)
        }
    }

    /// Deterministic salts `salt-1`, `salt-2`, ... with a shared draw counter.
    #[derive(Clone, Default)]
    struct SequentialSalt(Arc<AtomicU64>);

    impl SequentialSalt {
        fn drawn(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl SaltSource for SequentialSalt {
        fn salt(&self) -> String {
            format!("salt-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    async fn seed(store: &InMemoryUrlStore, url: &str, c: &str) {
        let outcome = store
            .insert_if_absent(NewUrlMapping::new(url, code(c)))
            .await
            .unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));
    }

    fn test_service() -> ShortenerService<InMemoryUrlStore, HashCodeGenerator> {
        ShortenerService::new(InMemoryUrlStore::new(), HashCodeGenerator::new())
    }

    #[tokio::test]
    async fn shorten_is_idempotent() {
        let service = test_service();

        let first = service.shorten("https://www.google.com").await.unwrap();
        let second = service.shorten("https://www.google.com").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.as_str(), "eswp9Xga");
        assert_eq!(service.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn distinct_urls_get_distinct_codes() {
        let service = test_service();

        let a = service.shorten("https://a.example").await.unwrap();
        let b = service.shorten("https://b.example").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(service.store().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn collision_is_resolved_with_salted_code() {
        let url = "https://b.example";
        let generator = HashCodeGenerator::new();
        let taken = generator.generate(url);

        let store = InMemoryUrlStore::new();
        seed(&store, "https://squatter.example", taken.as_str()).await;

        let salts = SequentialSalt::default();
        let service = ShortenerService::with_salt_source(store, generator, salts.clone());

        let code = service.shorten(url).await.unwrap();

        assert_ne!(code, taken);
        assert_eq!(code, generator.generate_salted(url, "salt-1"));
        assert_eq!(salts.drawn(), 1);

        let stored = service.store().find_by_short_code(&code).await.unwrap().unwrap();
        assert_eq!(stored.original_url, url);
    }

    #[tokio::test]
    async fn exhausted_retries_fail_without_creating_a_mapping() {
        let store = CountingStore::default();
        seed(&store.inner, "https://squatter.example", "fixed000").await;

        let salts = SequentialSalt::default();
        let service =
            ShortenerService::with_salt_source(store, FixedGenerator("fixed000"), salts.clone());

        let err = service.shorten("https://victim.example").await.unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::RetryLimitExceeded { attempts: 4 }
        ));
        assert_eq!(service.store().inserts(), 4);
        assert_eq!(salts.drawn(), 3);
        assert!(service
            .store()
            .find_by_original_url("https://victim.example")
            .await
            .unwrap()
            .is_none());
        assert_eq!(service.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn retry_bound_follows_settings() {
        let store = CountingStore::default();
        seed(&store.inner, "https://squatter.example", "fixed000").await;

        let service = ShortenerService::new(store, FixedGenerator("fixed000"))
            .with_settings(ShortenerSettings::builder().max_retries(0).build());

        let err = service.shorten("https://victim.example").await.unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::RetryLimitExceeded { attempts: 1 }
        ));
        assert_eq!(service.store().inserts(), 1);
    }

    #[tokio::test]
    async fn lost_race_returns_winner_code_without_salting() {
        let store = CountingStore::default();
        seed(&store.inner, "https://race.example", "winner00").await;
        store.hide_first_lookup.store(true, Ordering::SeqCst);

        let salts = SequentialSalt::default();
        let service =
            ShortenerService::with_salt_source(store, FixedGenerator("loser000"), salts.clone());

        let code = service.shorten("https://race.example").await.unwrap();

        assert_eq!(code.as_str(), "winner00");
        assert_eq!(service.store().inserts(), 1);
        assert_eq!(salts.drawn(), 0);
        assert_eq!(service.store().count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_shorten_of_same_url_creates_one_mapping() {
        let service = test_service();

        let mut handles = vec![];
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.shorten("https://race.example").await.unwrap()
            }));
        }

        let mut codes = vec![];
        for handle in handles {
            codes.push(handle.await.unwrap());
        }

        assert!(codes.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(service.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn resolve_returns_url_and_counts_access() {
        let service = test_service();
        let code = service.shorten("https://example.com/page").await.unwrap();

        for _ in 0..3 {
            let url = service.resolve(&code).await.unwrap();
            assert_eq!(url, "https://example.com/page");
        }

        let record = service.store().find_by_short_code(&code).await.unwrap().unwrap();
        assert_eq!(record.access_count, 3);
    }

    #[tokio::test]
    async fn resolve_unknown_code_is_not_found() {
        let service = test_service();

        let err = service.resolve(&code("missing0")).await.unwrap_err();

        assert!(matches!(err, ShortenerError::NotFound(ref c) if c == "missing0"));
        assert!(service.store().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolves_are_all_counted() {
        let service = test_service();
        let code = service.shorten("https://example.com").await.unwrap();

        let mut handles = vec![];
        for _ in 0..50 {
            let service = service.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                service.resolve(&code).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = service.store().find_by_short_code(&code).await.unwrap().unwrap();
        assert_eq!(record.access_count, 50);
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let service = test_service();
        let mut created = vec![];
        for i in 0..5 {
            created.push(
                service
                    .shorten(&format!("https://example{i}.com"))
                    .await
                    .unwrap(),
            );
        }

        let first = service.list(PageRequest::new(0, 2)).await.unwrap();
        let last = service.list(PageRequest::new(2, 2)).await.unwrap();
        let beyond = service.list(PageRequest::new(3, 2)).await.unwrap();

        assert_eq!(first.total_items, 5);
        assert_eq!(first.total_pages(), 3);
        assert_eq!(
            first.items.iter().map(|r| r.short_code.clone()).collect::<Vec<_>>(),
            created[..2].to_vec()
        );
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].short_code, created[4]);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_items, 5);
    }

    #[tokio::test]
    async fn list_rejects_invalid_pages() {
        let service = test_service();

        for request in [
            PageRequest::new(0, 0),
            PageRequest::new(0, MAX_PAGE_SIZE + 1),
            PageRequest::new(u64::MAX, 2),
        ] {
            let err = service.list(request).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidPage(_)), "{request:?}");
        }
    }
}
