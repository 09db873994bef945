mod health;
mod url;

pub use health::HealthResponse;
pub use url::{
    CreateUrlRequest, CreateUrlResponse, ListUrlsQuery, ListUrlsResponse, ResolveUrlResponse,
    UrlSummary, DEFAULT_PAGE_SIZE,
};
