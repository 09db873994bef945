use crate::mapping::UrlMapping;
use crate::page::{Page, PageRequest};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short code for `original_url`, creating the mapping on
    /// first use. Repeated calls for the same URL return the same code.
    async fn shorten(&self, original_url: &str) -> Result<ShortCode>;

    /// Resolves a short code to its original URL and counts the access.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Lists stored mappings in creation order.
    async fn list(&self, request: PageRequest) -> Result<Page<UrlMapping>>;
}
