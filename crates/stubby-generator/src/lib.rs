//! Short code generation: SHA-256 digest, base62 encoding and truncation
//! to a fixed display length.

pub mod base62;
pub mod hash;
pub mod salt;

pub use salt::{SaltSource, UuidSalt};

use stubby_core::{ShortCode, SHORT_CODE_LENGTH};
use tracing::trace;

/// Trait for generating short codes from an input string.
///
/// Implementations are pure generators that don't interact with storage.
/// The same input must always produce the same code, so escaping a
/// collision means changing the input, see [`generate_salted`].
///
/// [`generate_salted`]: CodeGenerator::generate_salted
pub trait CodeGenerator: Send + Sync + 'static {
    /// Generates the short code for `input`.
    fn generate(&self, input: &str) -> ShortCode;

    /// Generates a short code for `input` with `salt` appended to it.
    fn generate_salted(&self, input: &str, salt: &str) -> ShortCode {
        self.generate(&format!("{input}{salt}"))
    }
}

/// The default generator: `sha256(input)`, base62-encoded, first
/// [`SHORT_CODE_LENGTH`] symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCodeGenerator;

impl HashCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for HashCodeGenerator {
    fn generate(&self, input: &str) -> ShortCode {
        let digest = hash::sha256(input);
        let encoded = base62::encode(&digest);
        let code = fit_to_length(encoded, SHORT_CODE_LENGTH);
        trace!(code = %code, "generated short code");
        ShortCode::new_unchecked(code)
    }
}

/// Keeps the first `length` symbols, left-padding with the zero symbol
/// when the encoding is shorter.
fn fit_to_length(mut encoded: String, length: usize) -> String {
    if encoded.len() < length {
        let zero = char::from(stubby_core::ALPHABET[0]);
        let padding: String = std::iter::repeat(zero)
            .take(length - encoded.len())
            .collect();
        encoded.insert_str(0, &padding);
    }
    encoded.truncate(length);
    encoded
}
