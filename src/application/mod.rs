//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the [`CacheService`] capability and
//! decide how each operation degrades when a dependency fails. Every policy is
//! a plain function over a [`CacheResult`], so it can be tested without a
//! cache.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Cache-aside short link creation and resolution
//! - [`services::rate_limiter::RateLimiter`] - Fixed-window limiter that fails open
//! - [`services::click_tracker::ClickTracker`] - Click counting with lazy reconciliation
//!
//! [`CacheService`]: crate::infrastructure::cache::CacheService
//! [`CacheResult`]: crate::infrastructure::cache::CacheResult

pub mod services;
