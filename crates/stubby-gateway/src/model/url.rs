use serde::{Deserialize, Serialize};
use stubby_core::{Page, UrlMapping};

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Deserialize)]
pub struct CreateUrlRequest {
    pub original_url: String,
}

#[derive(Serialize)]
pub struct CreateUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
}

#[derive(Serialize)]
pub struct ResolveUrlResponse {
    pub original_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUrlsQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Serialize)]
pub struct UrlSummary {
    pub id: u64,
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub access_count: u64,
}

#[derive(Serialize)]
pub struct ListUrlsResponse {
    pub items: Vec<UrlSummary>,
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl ListUrlsResponse {
    /// Builds the response body, rendering each mapping with `short_url`.
    pub fn from_page(page: Page<UrlMapping>, short_url: impl Fn(&UrlMapping) -> String) -> Self {
        let total_pages = page.total_pages();
        let (page_number, page_size, total_items) =
            (page.page_number, page.page_size, page.total_items);

        let items = page
            .items
            .into_iter()
            .map(|mapping| UrlSummary {
                short_url: short_url(&mapping),
                id: mapping.id,
                short_code: mapping.short_code.into_inner(),
                original_url: mapping.original_url,
                access_count: mapping.access_count,
            })
            .collect();

        Self {
            items,
            page: page_number,
            size: page_size,
            total_items,
            total_pages,
        }
    }
}
