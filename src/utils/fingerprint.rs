//! Content fingerprints used to deduplicate identical long URLs.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 digest of `long_url`.
///
/// The URL is hashed byte-for-byte; no normalization is applied, so
/// `https://a.com` and `https://a.com/` get distinct fingerprints.
pub fn fingerprint(long_url: &str) -> String {
    hex::encode(Sha256::digest(long_url.as_bytes()))
}
