#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use link_cache::application::services::{ClickTracker, LinkService, RateLimitConfig};
use link_cache::infrastructure::cache::{CacheService, MemoryCache, keys};
use link_cache::infrastructure::persistence::MemoryStore;
use link_cache::routes::api_router;
use link_cache::state::{AppState, StateOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const BASE_URL: &str = "https://s.example";

/// In-process backends shared by a test and the code under test.
pub struct Backends {
    pub cache: MemoryCache,
    pub store: MemoryStore,
}

impl Backends {
    pub fn new() -> Self {
        Self {
            cache: MemoryCache::new(),
            store: MemoryStore::new(),
        }
    }

    pub fn link_service(&self) -> LinkService<MemoryStore> {
        LinkService::new(
            Arc::new(self.store.clone()),
            Arc::new(self.cache.clone()),
            86_400,
        )
    }

    pub fn click_tracker(&self) -> ClickTracker<MemoryStore> {
        ClickTracker::new(Arc::new(self.store.clone()), Arc::new(self.cache.clone()))
    }

    pub fn state(&self, rate_limit: RateLimitConfig) -> AppState {
        AppState::new(
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.cache.clone()),
            StateOptions {
                base_url: BASE_URL.to_string(),
                behind_proxy: true,
                cache_ttl_seconds: 86_400,
                rate_limit,
            },
        )
    }
}

pub fn test_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_requests: 3,
        window_seconds: 60,
    }
}

/// Full router with every middleware, served with a fixed peer address.
pub fn create_test_server(backends: &Backends) -> TestServer {
    create_test_server_with_limit(backends, test_rate_limit())
}

pub fn create_test_server_with_limit(backends: &Backends, limit: RateLimitConfig) -> TestServer {
    let app: Router = api_router(backends.state(limit)).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

/// Polls until the spawned click task for a redirect has landed.
pub async fn wait_for_clicks(backends: &Backends, short_key: &str, expected: u64) {
    let key = keys::clicks_key(short_key);
    for _ in 0..50 {
        let counted = backends
            .cache
            .get(&key)
            .await
            .ok()
            .flatten()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let durable = backends
            .store
            .analytics_snapshot(short_key)
            .map_or(0, |record| record.total_clicks);

        if counted + durable >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("clicks for {short_key} did not reach {expected}");
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
