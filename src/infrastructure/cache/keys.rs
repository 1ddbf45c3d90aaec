//! Cache key layout shared by all services.

/// Global sequence counter used to assign short keys.
pub const SEQUENCE_KEY: &str = "id";

/// `fingerprint -> short key`
pub fn hash_key(fingerprint: &str) -> String {
    format!("hash:{fingerprint}")
}

/// `sequence id -> long URL`
pub fn url_key(sequence_id: u64) -> String {
    format!("url:{sequence_id}")
}

/// Per-identifier fixed-window request counter.
pub fn rate_limit_key(identifier: &str) -> String {
    format!("ratelimit:{identifier}")
}

/// Fast-path click counter.
pub fn clicks_key(short_key: &str) -> String {
    format!("analytics:{short_key}:clicks")
}

/// Last access time in unix milliseconds.
pub fn last_access_key(short_key: &str) -> String {
    format!("analytics:{short_key}:last_access")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(hash_key("ab12"), "hash:ab12");
        assert_eq!(url_key(42), "url:42");
        assert_eq!(rate_limit_key("10.0.0.1"), "ratelimit:10.0.0.1");
        assert_eq!(clicks_key("b"), "analytics:b:clicks");
        assert_eq!(last_access_key("b"), "analytics:b:last_access");
    }
}
