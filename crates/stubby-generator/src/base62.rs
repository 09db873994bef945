use num_bigint::BigUint;
use num_traits::Zero;
use stubby_core::ALPHABET;

const BASE: u32 = 62;

/// Encodes `bytes`, read as an unsigned big-endian integer, in base62.
///
/// The most significant symbol comes first. The output has no fixed width:
/// zero (including an empty or all-zero input) encodes to the empty string.
pub fn encode(bytes: &[u8]) -> String {
    let number = BigUint::from_bytes_be(bytes);
    if number.is_zero() {
        return String::new();
    }

    number
        .to_radix_be(BASE)
        .into_iter()
        .map(|digit| char::from(ALPHABET[usize::from(digit)]))
        .collect()
}
