use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::services::realtor::SearchQuery;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-tier cache for listings API responses and listing lookups
///
/// L1 is a per-process moka cache; L2 is Redis, shared across instances.
/// Both tiers expire entries after the configured TTL.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Arc<String>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Look a value up, L1 first. A miss is `Ok(None)`.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        if let Some(json) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_str(&json)?));
        }

        let value: Option<String> = {
            let mut conn = self.redis.lock().await;
            redis::cmd("GET").arg(key).query_async(&mut *conn).await?
        };

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_str(&json)?;
                self.l1_cache.insert(key.to_string(), Arc::new(json)).await;
                Ok(Some(parsed))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Store a value in both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        {
            let mut conn = self.redis.lock().await;
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(&json)
                .query_async(&mut *conn)
                .await?;
        }

        self.l1_cache.insert(key.to_string(), Arc::new(json)).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete keys from both tiers
    pub async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }

        for key in keys {
            self.l1_cache.invalidate(key).await;
        }

        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }

        let mut conn = self.redis.lock().await;
        let _: () = cmd.query_async(&mut *conn).await?;

        tracing::debug!("Invalidated {} cache keys", keys.len());
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for one listing by id
    pub fn listing(id: &str) -> String {
        format!("listing:{}", id)
    }

    /// Key for one page of listings API results
    pub fn search(query: &SearchQuery) -> String {
        let location = match &query.postal_code {
            Some(zip) => format!("zip={}", zip),
            None => format!("{},{}", query.city.to_lowercase(), query.state_code.to_lowercase()),
        };

        format!(
            "search:{}:{}:{}:{}:{}:{}",
            location,
            query.limit,
            query.offset,
            opt(query.price_min),
            opt(query.price_max),
            opt(query.beds_min),
        )
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
