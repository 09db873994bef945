use typed_builder::TypedBuilder;

/// Salted retries allowed after the first, unsalted attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// How many salted regenerations follow a short code collision before
    /// `shorten` gives up. The total number of insert attempts is one more.
    #[builder(default = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl ShortenerSettings {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
