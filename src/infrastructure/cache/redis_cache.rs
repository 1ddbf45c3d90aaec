//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Raises `KEYS[1]` to `ARGV[1]` unless it already holds a larger value.
const RAISE_TO_SCRIPT: &str = r"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
local floor = tonumber(ARGV[1])
if current < floor then
  redis.call('SET', KEYS[1], ARGV[1], 'KEEPTTL')
  return floor
end
return current
";

/// Redis cache with per-operation timeouts.
///
/// Uses `ConnectionManager` for connection reuse and automatic reconnection.
/// Errors are logged and returned to the caller; a timed-out call is reported
/// as [`CacheError::Timeout`] so a slow Redis cannot stall request handling.
pub struct RedisCache {
    client: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `op_timeout` - Upper bound for every subsequent cache operation;
    ///   controlled via `CACHE_TIMEOUT_MS`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Unavailable(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            op_timeout,
        })
    }

    /// Runs a Redis call under the configured timeout.
    async fn bounded<T, F>(&self, op: &'static str, key: &str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Redis {} error for {}: {}", op, key, e);
                if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
                    Err(CacheError::Unavailable(e.to_string()))
                } else {
                    Err(CacheError::Operation(e.to_string()))
                }
            }
            Err(_) => {
                let millis = self.op_timeout.as_millis() as u64;
                warn!("Redis {} timed out for {} after {}ms", op, key, millis);
                Err(CacheError::Timeout(millis))
            }
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.client.clone();
        let value = self
            .bounded(
                "INCR",
                key,
                redis::cmd("INCR").arg(key).query_async::<i64>(&mut conn),
            )
            .await?;

        debug!("Cache INCR: {} -> {}", key, value);
        Ok(value)
    }

    async fn raise_to(&self, key: &str, floor: i64) -> CacheResult<i64> {
        let mut conn = self.client.clone();
        let value = self
            .bounded(
                "EVAL",
                key,
                redis::cmd("EVAL")
                    .arg(RAISE_TO_SCRIPT)
                    .arg(1)
                    .arg(key)
                    .arg(floor)
                    .query_async::<i64>(&mut conn),
            )
            .await?;

        debug!("Cache RAISE: {} >= {} -> {}", key, floor, value);
        Ok(value)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();
        let value = self
            .bounded("GET", key, conn.get::<_, Option<String>>(key))
            .await?;

        match &value {
            Some(_) => debug!("Cache HIT: {}", key),
            None => debug!("Cache MISS: {}", key),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.client.clone();
        self.bounded("SET", key, conn.set_ex::<_, _, ()>(key, value, ttl_seconds))
            .await?;

        debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn set_persistent(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        self.bounded("SET", key, conn.set::<_, _, ()>(key, value))
            .await?;

        debug!("Cache SET: {} (no expiry)", key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool> {
        let mut conn = self.client.clone();
        let updated = self
            .bounded(
                "EXPIRE",
                key,
                redis::cmd("EXPIRE")
                    .arg(key)
                    .arg(ttl_seconds)
                    .query_async::<i64>(&mut conn),
            )
            .await?;

        Ok(updated == 1)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        let mut conn = self.client.clone();
        // -2: missing key, -1: no expiry
        let remaining = self
            .bounded(
                "TTL",
                key,
                redis::cmd("TTL").arg(key).query_async::<i64>(&mut conn),
            )
            .await?;

        Ok(u64::try_from(remaining).ok())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded("PING", "-", conn.ping::<()>()).await.is_ok()
    }
}
