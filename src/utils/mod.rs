//! Utility functions for short key encoding and content fingerprinting.
//!
//! - [`base62`] - Sequence number to short key codec
//! - [`fingerprint`] - SHA-256 fingerprint of long URLs
//! - [`client_ip`] - Client identifier extraction for rate limiting

pub mod base62;
pub mod client_ip;
pub mod fingerprint;
