//! Business logic services for the application layer.

pub mod click_tracker;
pub mod link_service;
pub mod rate_limiter;

pub use click_tracker::ClickTracker;
pub use link_service::LinkService;
pub use rate_limiter::{RateLimitConfig, RateLimitDecision, RateLimiter};
