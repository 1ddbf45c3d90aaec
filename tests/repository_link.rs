use link_cache::domain::entities::NewLinkRecord;
use link_cache::domain::repositories::LinkRepository;
use link_cache::error::AppError;
use link_cache::infrastructure::persistence::PgLinkRepository;
use link_cache::utils::fingerprint::fingerprint;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(sequence_id: Option<u64>, url: &str) -> NewLinkRecord {
    NewLinkRecord {
        sequence_id,
        long_url: url.to_string(),
        content_hash: fingerprint(url),
    }
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_insert_with_counter_sequence(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let outcome = repo
        .insert_if_absent(new_link(Some(1), "https://example.com/a"))
        .await
        .unwrap();

    assert!(outcome.inserted);
    assert_eq!(outcome.record.sequence_id, 1);
    assert_eq!(outcome.record.short_key, "b");
    assert_eq!(outcome.record.long_url, "https://example.com/a");
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_insert_with_store_sequence(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let outcome = repo
        .insert_if_absent(new_link(None, "https://example.com/store"))
        .await
        .unwrap();

    assert!(outcome.inserted);
    assert_eq!(
        outcome.record.short_key,
        link_cache::utils::base62::encode(outcome.record.sequence_id)
    );
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_store_sequence_skips_counter_values(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.insert_if_absent(new_link(Some(40), "https://example.com/counter"))
        .await
        .unwrap();

    let outcome = repo
        .insert_if_absent(new_link(None, "https://example.com/durable"))
        .await
        .unwrap();

    assert!(outcome.record.sequence_id > 40);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_concurrent_store_sequences_all_succeed(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    // Occupy the low range so every insert has to skip past the counter's values
    repo.insert_if_absent(new_link(Some(5), "https://example.com/counter"))
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let repo = repo.clone();
        tasks.spawn(async move {
            repo.insert_if_absent(new_link(None, &format!("https://example.com/concurrent/{i}")))
                .await
        });
    }

    let mut sequences = Vec::new();
    while let Some(result) = tasks.join_next().await {
        let outcome = result.unwrap().unwrap();
        assert!(outcome.inserted);
        assert!(outcome.record.sequence_id > 5);
        sequences.push(outcome.record.sequence_id);
    }

    sequences.sort_unstable();
    sequences.dedup();
    assert_eq!(sequences.len(), 8);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_duplicate_fingerprint_returns_winner(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool.clone()));
    let first = repo
        .insert_if_absent(new_link(Some(7), "https://example.com/dup"))
        .await
        .unwrap();

    let second = repo
        .insert_if_absent(new_link(Some(8), "https://example.com/dup"))
        .await
        .unwrap();

    assert!(!second.inserted);
    assert_eq!(second.record.short_key, first.record.short_key);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_taken_sequence_is_conflict(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.insert_if_absent(new_link(Some(3), "https://example.com/one"))
        .await
        .unwrap();

    let result = repo
        .insert_if_absent(new_link(Some(3), "https://example.com/two"))
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_find_by_short_key_and_fingerprint(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.insert_if_absent(new_link(Some(2), "https://example.com/find"))
        .await
        .unwrap();

    let by_key = repo.find_by_short_key("c").await.unwrap().unwrap();
    assert_eq!(by_key.long_url, "https://example.com/find");

    let by_hash = repo
        .find_by_fingerprint(&fingerprint("https://example.com/find"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_hash.sequence_id, 2);

    assert!(repo.find_by_short_key("zzz").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_list_recent(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    for (seq, url) in [(1, "https://a.com"), (2, "https://b.com"), (3, "https://c.com")] {
        repo.insert_if_absent(new_link(Some(seq), url)).await.unwrap();
    }

    let links = repo.list_recent(2).await.unwrap();

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].sequence_id, 3);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn test_health_check(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    assert!(repo.health_check().await);
}
