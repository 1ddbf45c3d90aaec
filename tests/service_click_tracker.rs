mod common;

use chrono::Utc;
use common::Backends;
use link_cache::domain::entities::DataSource;
use link_cache::error::AppError;
use link_cache::infrastructure::cache::{CacheService, keys};

#[tokio::test]
async fn test_clicks_counted_in_cache() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();
    tracker.initialize("b").await.unwrap();

    for _ in 0..5 {
        tracker.record_click("b").await.unwrap();
    }

    assert_eq!(
        backends.cache.get(&keys::clicks_key("b")).await.unwrap(),
        Some("5".to_string())
    );
    // Nothing reaches the store until stats are read
    assert_eq!(backends.store.analytics_snapshot("b").unwrap().total_clicks, 0);

    let stats = tracker.get_stats("b").await.unwrap();
    assert_eq!(stats.total_clicks, 5);
    assert!(stats.last_accessed_at.is_some());
    assert_eq!(stats.data_source, DataSource::CacheAndDurable);
    assert_eq!(backends.store.analytics_snapshot("b").unwrap().total_clicks, 5);
}

#[tokio::test]
async fn test_total_clicks_never_decrease() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();
    tracker.initialize("c").await.unwrap();

    let mut previous = 0;
    for round in 0..4 {
        for _ in 0..3 {
            tracker.record_click("c").await.unwrap();
        }

        // Lose the fast counters halfway through
        if round == 2 {
            backends.cache.flush();
        }

        let total = tracker.get_stats("c").await.unwrap().total_clicks;
        assert!(total >= previous, "{total} < {previous}");
        previous = total;
    }
}

#[tokio::test]
async fn test_stale_fast_counter_does_not_lower_durable_total() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();
    tracker.initialize("d").await.unwrap();

    backends.cache.set_available(false);
    for _ in 0..4 {
        tracker.record_click("d").await.unwrap();
    }
    backends.cache.set_available(true);
    tracker.record_click("d").await.unwrap();

    let stats = tracker.get_stats("d").await.unwrap();
    assert_eq!(stats.total_clicks, 4);
    assert_eq!(stats.data_source, DataSource::CacheAndDurable);
}

#[tokio::test]
async fn test_cache_outage_falls_back_to_durable_counts() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();
    backends.cache.set_available(false);

    for _ in 0..3 {
        tracker.record_click("e").await.unwrap();
    }

    let record = backends.store.analytics_snapshot("e").unwrap();
    assert_eq!(record.total_clicks, 3);
    assert_eq!(record.clicks_today, 3);
    assert_eq!(record.last_aggregation_date, Utc::now().date_naive());

    let stats = tracker.get_stats("e").await.unwrap();
    assert_eq!(stats.total_clicks, 3);
    assert_eq!(stats.data_source, DataSource::DurableOnly);
}

#[tokio::test]
async fn test_unknown_key_returns_zeroed_stats() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();

    let stats = tracker.get_stats("nothing").await.unwrap();

    assert_eq!(stats.total_clicks, 0);
    assert!(stats.last_accessed_at.is_none());
    assert!(backends.store.analytics_snapshot("nothing").is_none());
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();

    tracker.initialize("f").await.unwrap();
    backends.cache.set_available(false);
    tracker.record_click("f").await.unwrap();
    tracker.initialize("f").await.unwrap();

    assert_eq!(backends.store.analytics_snapshot("f").unwrap().total_clicks, 1);
}

#[tokio::test]
async fn test_click_fails_only_when_both_tiers_fail() {
    let backends = Backends::new();
    let tracker = backends.click_tracker();
    backends.cache.set_available(false);
    backends.store.set_available(false);

    assert!(matches!(
        tracker.record_click("g").await,
        Err(AppError::Unavailable { .. })
    ));
    assert!(tracker.get_stats("g").await.is_err());
}
