//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{ClickTracker, LinkService, RateLimitConfig, RateLimiter};
use crate::config::Config;
use crate::domain::repositories::{AnalyticsRepository, LinkRepository};
use crate::infrastructure::cache::CacheService;

/// Settings the services need beyond their backends.
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub base_url: String,
    pub behind_proxy: bool,
    pub cache_ttl_seconds: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            behind_proxy: false,
            cache_ttl_seconds: 86_400,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl From<&Config> for StateOptions {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            behind_proxy: config.behind_proxy,
            cache_ttl_seconds: config.cache_ttl_seconds,
            rate_limit: config.rate_limit(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub click_tracker: Arc<ClickTracker<dyn AnalyticsRepository>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cache: Arc<dyn CacheService>,
    pub base_url: String,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services over the given backends. All services share `cache`.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        analytics_repository: Arc<dyn AnalyticsRepository>,
        cache: Arc<dyn CacheService>,
        options: StateOptions,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(
            link_repository,
            cache.clone(),
            options.cache_ttl_seconds,
        ));
        let click_tracker = Arc::new(ClickTracker::new(analytics_repository, cache.clone()));
        let rate_limiter = Arc::new(RateLimiter::new(cache.clone(), options.rate_limit));

        Self {
            link_service,
            click_tracker,
            rate_limiter,
            cache,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            behind_proxy: options.behind_proxy,
        }
    }
}
