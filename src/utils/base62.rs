//! Base62 encoding of sequence numbers into short keys.
//!
//! The alphabet is `a-z`, `A-Z`, `0-9` in that order, so digit value 0 is `'a'`
//! and `encode(0)` yields `"a"` rather than an empty string.

use crate::error::AppError;
use serde_json::json;

const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const BASE: u64 = 62;

/// Errors produced when decoding a short key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Base62Error {
    #[error("Short key is empty")]
    Empty,

    #[error("Invalid symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("Short key value does not fit in 64 bits")]
    Overflow,
}

impl From<Base62Error> for AppError {
    fn from(err: Base62Error) -> Self {
        AppError::bad_request("Invalid short key", json!({ "reason": err.to_string() }))
    }
}

/// Encodes a sequence number as a base62 string.
///
/// # Examples
///
/// ```
/// use link_cache::utils::base62::encode;
///
/// assert_eq!(encode(0), "a");
/// assert_eq!(encode(1), "b");
/// assert_eq!(encode(62), "ba");
/// ```
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    digits.reverse();

    // Every byte comes from the ASCII alphabet.
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base62 short key back into its sequence number.
///
/// # Errors
///
/// - [`Base62Error::Empty`] for an empty string
/// - [`Base62Error::InvalidSymbol`] for any character outside the alphabet
/// - [`Base62Error::Overflow`] if the value exceeds `u64::MAX`
pub fn decode(key: &str) -> Result<u64, Base62Error> {
    if key.is_empty() {
        return Err(Base62Error::Empty);
    }

    key.chars().enumerate().try_fold(0u64, |acc, (position, symbol)| {
        let digit = digit_value(symbol).ok_or(Base62Error::InvalidSymbol { symbol, position })?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(Base62Error::Overflow)
    })
}

fn digit_value(symbol: char) -> Option<u64> {
    match symbol {
        'a'..='z' => Some(symbol as u64 - 'a' as u64),
        'A'..='Z' => Some(symbol as u64 - 'A' as u64 + 26),
        '0'..='9' => Some(symbol as u64 - '0' as u64 + 52),
        _ => None,
    }
}
