//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,
}

impl ShortenRequest {
    /// Validates the request and returns the URL to shorten.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed URLs and for any scheme
    /// other than `http` or `https`.
    pub fn target(&self) -> Result<&str, AppError> {
        self.validate()?;

        let scheme = url::Url::parse(&self.url)
            .map(|parsed| parsed.scheme().to_string())
            .map_err(|e| {
                AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
            })?;

        if scheme != "http" && scheme != "https" {
            return Err(AppError::bad_request(
                "Only http and https URLs can be shortened",
                json!({ "scheme": scheme }),
            ));
        }

        Ok(&self.url)
    }
}

/// Created (or existing) short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_key: String,
    pub short_url: String,
    pub long_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> ShortenRequest {
        ShortenRequest {
            url: url.to_string(),
        }
    }

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            request("https://example.com/a").target().unwrap(),
            "https://example.com/a"
        );
        assert!(request("http://example.com").target().is_ok());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            request("ftp://example.com/file").target(),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(request("not a url").target().is_err());
        assert!(request("").target().is_err());
    }

    #[test]
    fn test_rejects_overlong_url() {
        let url = format!("https://example.com/{}", "a".repeat(2048));
        assert!(request(&url).target().is_err());
    }
}
