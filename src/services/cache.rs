//! Redis-backed article cache.
//!
//! Values are plain strings stored with `SET` and no expiry. The connection is
//! opened lazily on first use, retried a fixed number of times at a fixed
//! interval, then shared through a `ConnectionManager`. A failed connect is
//! reported to the caller and attempted again on the next call.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::config::RedisSettings;
use crate::error::CacheError;

/// Key-value store holding simplified articles by article id.
#[async_trait]
pub trait ArticleCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    async fn health_check(&self) -> Result<(), CacheError>;
}

/// Constant delay, bounded number of retries.
#[derive(Debug, Clone)]
pub struct FixedRetry {
    interval: Duration,
    max_retries: u32,
    remaining: u32,
}

impl FixedRetry {
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            interval,
            max_retries,
            remaining: max_retries,
        }
    }
}

impl Backoff for FixedRetry {
    fn reset(&mut self) {
        self.remaining = self.max_retries;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.interval)
    }
}

/// Redis cache client with lazy, retried connection setup.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    max_retries: u32,
    retry_interval: Duration,
}

impl RedisCache {
    /// Create the client. No connection is attempted until first use.
    pub fn new(settings: &RedisSettings) -> Result<Self, CacheError> {
        let client = redis::Client::open(settings.url.as_str())?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            max_retries: settings.max_retries,
            retry_interval: settings.retry_interval,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self.conn.get_or_try_init(|| self.connect()).await?;
        Ok(conn.clone())
    }

    async fn connect(&self) -> Result<ConnectionManager, CacheError> {
        let mut attempts = 0u32;
        let policy = FixedRetry::new(self.max_retries, self.retry_interval);

        let result = backoff::future::retry_notify(
            policy,
            || {
                attempts += 1;
                let client = self.client.clone();
                async move {
                    // ConnectionManager::new has its own reconnect loop; probe first so
                    // each attempt here fails fast.
                    client
                        .get_multiplexed_async_connection()
                        .await
                        .map_err(backoff::Error::transient)?;
                    ConnectionManager::new(client)
                        .await
                        .map_err(backoff::Error::transient)
                }
            },
            |e: redis::RedisError, wait: Duration| {
                warn!(error = %e, retry_in = ?wait, "Redis connect failed, retrying");
            },
        )
        .await;

        match result {
            Ok(conn) => {
                tracing::info!(attempts, "Redis cache connected");
                Ok(conn)
            }
            Err(source) => Err(CacheError::Connect { attempts, source }),
        }
    }
}

#[async_trait]
impl ArticleCache for RedisCache {
    #[instrument(skip(self), fields(cache_hit))]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;

        let value: Option<String> = conn.get(key).await?;
        let hit = value.is_some();
        tracing::Span::current().record("cache_hit", hit);
        debug!(key = key, hit, "Cache lookup");

        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        conn.set::<_, _, ()>(key, value).await?;

        debug!(key = key, bytes = value.len(), "Cached value");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
