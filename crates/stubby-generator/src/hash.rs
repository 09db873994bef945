use sha2::{Digest, Sha256};

/// Size in bytes of a SHA-256 digest.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 digest of the UTF-8 bytes of `input`.
pub fn sha256(input: &str) -> [u8; DIGEST_LEN] {
    Sha256::digest(input.as_bytes()).into()
}
