//! Short code generation and input validation.

use rand::RngExt;
use url::Url;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;
pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 8;

/// Generate a random short code drawn uniformly from `[A-Za-z0-9]`.
///
/// Uniqueness is not checked here; callers check the store.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Whether `code` is 6 to 8 ASCII alphanumeric characters.
pub fn is_valid_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Whether `url` parses as an absolute URL with a scheme and a host.
///
/// Whitespace and control characters are rejected outright: the parser would
/// silently strip them, leaving a stored target that is not a valid header value.
/// No reachability check is made.
pub fn is_valid_url(url: &str) -> bool {
    if url.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => parsed.has_host() && parsed.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
