//! Client identifier extraction for rate limiting.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Returns the identifier used to rate-limit a client.
///
/// When `behind_proxy` is `true`, the first hop of `X-Forwarded-For` is used,
/// then `X-Real-IP`. Otherwise, or when neither header carries a usable value,
/// the socket peer IP is used. Ports are never part of the identifier.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let peer: SocketAddr = "10.0.0.1:4431".parse().unwrap();
/// assert_eq!(client_identifier(&headers, peer, true), "203.0.113.7");
/// assert_eq!(client_identifier(&headers, peer, false), "10.0.0.1");
/// ```
pub fn client_identifier(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get(X_REAL_IP)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}
