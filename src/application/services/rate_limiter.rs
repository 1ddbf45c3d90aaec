//! Fixed-window request limiter backed by the shared cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, CacheService, keys};

/// Limiter settings, controlled via `RATE_LIMIT_MAX_REQUESTS` and
/// `RATE_LIMIT_WINDOW_SECONDS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_seconds: 60,
        }
    }
}

/// Result of a single [`RateLimiter::allow`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the current window expires.
    pub reset_seconds: u64,
}

/// Counter state observed in the cache after incrementing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowObservation {
    pub count: i64,
    pub ttl_seconds: u64,
}

/// Turns a window observation into a decision.
///
/// Any cache error allows the request and reports a fresh window.
pub fn decide(
    config: &RateLimitConfig,
    observed: &CacheResult<WindowObservation>,
) -> RateLimitDecision {
    match observed {
        Ok(window) => {
            let count = u64::try_from(window.count).unwrap_or(0);
            let max = u64::from(config.max_requests);
            let remaining = max.saturating_sub(count);

            RateLimitDecision {
                allowed: count <= max,
                remaining: u32::try_from(remaining).unwrap_or(config.max_requests),
                reset_seconds: window.ttl_seconds,
            }
        }
        Err(_) => RateLimitDecision {
            allowed: true,
            remaining: config.max_requests,
            reset_seconds: config.window_seconds,
        },
    }
}

/// Per-identifier fixed-window limiter.
///
/// The window TTL is set only when the counter is created, so requests late in
/// a window never extend it. Denied requests still increment the counter.
///
/// The limiter fails open: if the cache cannot be reached the request is
/// allowed. Each call tries the cache afresh; the last outcome is kept only to
/// log transitions between healthy and degraded.
pub struct RateLimiter {
    cache: Arc<dyn CacheService>,
    config: RateLimitConfig,
    degraded: AtomicBool,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheService>, config: RateLimitConfig) -> Self {
        Self {
            cache,
            config,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Returns `true` if the last call could not reach the cache.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Counts a request for `identifier` and decides whether it may proceed.
    pub async fn allow(&self, identifier: &str) -> RateLimitDecision {
        let key = keys::rate_limit_key(identifier);
        let observed = self.observe(&key).await;

        match &observed {
            Ok(window) => {
                if self.degraded.swap(false, Ordering::Relaxed) {
                    info!("Rate limiter recovered");
                }
                debug!(identifier, count = window.count, "Rate window observed");
            }
            Err(e) => {
                if !self.degraded.swap(true, Ordering::Relaxed) {
                    warn!(identifier, error = %e, "Rate limiter degraded, failing open");
                }
            }
        }

        let decision = decide(&self.config, &observed);
        if !decision.allowed {
            info!(
                identifier,
                retry_after = decision.reset_seconds,
                "Rate limit exceeded"
            );
        }
        decision
    }

    /// Converts a denial into the error returned to callers.
    pub fn rejection(&self, decision: &RateLimitDecision) -> AppError {
        AppError::RateLimited {
            max_requests: self.config.max_requests,
            window_seconds: self.config.window_seconds,
            retry_after_seconds: decision.reset_seconds,
        }
    }

    async fn observe(&self, key: &str) -> CacheResult<WindowObservation> {
        let window = self.config.window_seconds;
        let count = self.cache.incr(key).await?;

        if count == 1 {
            self.cache.expire(key, window).await?;
            return Ok(WindowObservation {
                count,
                ttl_seconds: window,
            });
        }

        let ttl_seconds = match self.cache.ttl(key).await? {
            Some(ttl) => ttl,
            None => {
                // Counter survived without an expiry (e.g. EXPIRE lost after INCR).
                self.cache.expire(key, window).await?;
                window
            }
        };

        Ok(WindowObservation { count, ttl_seconds })
    }
}
