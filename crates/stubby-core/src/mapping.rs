use crate::shortcode::ShortCode;
use serde::{Deserialize, Serialize};

/// A persisted mapping from an original URL to its short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// Surrogate identifier assigned by the store at creation.
    pub id: u64,
    /// The original URL that was shortened.
    pub original_url: String,
    /// The short code substituted for the original URL.
    pub short_code: ShortCode,
    /// How many times the short code has been resolved.
    pub access_count: u64,
}

/// A mapping to be created. The store assigns the id and starts the
/// access count at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlMapping {
    pub original_url: String,
    pub short_code: ShortCode,
}

impl NewUrlMapping {
    pub fn new(original_url: impl Into<String>, short_code: ShortCode) -> Self {
        Self {
            original_url: original_url.into(),
            short_code,
        }
    }
}
