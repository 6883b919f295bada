use moka::future::Cache;
use redis::AsyncCommands;
use std::time::Duration;

/// Wallet balances in lamports, keyed by address. Lookups hit the in-process
/// tier first and fall back to Redis when it is reachable.
pub struct CacheService {
    redis: Option<redis::aio::ConnectionManager>,
    balances: Cache<String, u64>,
    ttl_secs: u64,
}

impl CacheService {
    pub async fn new(redis_url: &str, ttl_secs: u64) -> Self {
        let redis = match redis::Client::open(redis_url) {
            Ok(client) => match client.get_connection_manager().await {
                Ok(conn) => {
                    tracing::info!("Redis connected successfully");
                    Some(conn)
                }
                Err(e) => {
                    tracing::warn!("Redis connection failed: {}, caching balances in memory only", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Redis client creation failed: {}, caching balances in memory only", e);
                None
            }
        };

        Self::build(redis, ttl_secs)
    }

    pub fn memory_only(ttl_secs: u64) -> Self {
        Self::build(None, ttl_secs)
    }

    fn build(redis: Option<redis::aio::ConnectionManager>, ttl_secs: u64) -> Self {
        let ttl_secs = ttl_secs.max(1);
        Self {
            redis,
            balances: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build(),
            ttl_secs,
        }
    }

    fn redis_key(address: &str) -> String {
        format!("balance:{}", address)
    }

    pub async fn balance(&self, address: &str) -> Option<u64> {
        if let Some(lamports) = self.balances.get(address).await {
            tracing::debug!("Memory cache hit for balance of {}", address);
            return Some(lamports);
        }

        let mut redis = self.redis.clone()?;
        match redis.get::<_, Option<u64>>(Self::redis_key(address)).await {
            Ok(Some(lamports)) => {
                self.balances.insert(address.to_string(), lamports).await;
                tracing::debug!("Redis cache hit for balance of {}", address);
                Some(lamports)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Redis get error: {}", e);
                None
            }
        }
    }

    /// Redis write failures are logged; the memory tier always takes the value.
    pub async fn store_balance(&self, address: &str, lamports: u64) {
        self.balances.insert(address.to_string(), lamports).await;

        if let Some(mut redis) = self.redis.clone() {
            match redis
                .set_ex::<_, _, ()>(Self::redis_key(address), lamports, self.ttl_secs)
                .await
            {
                Ok(()) => tracing::debug!("Cached balance of {} for {}s", address, self.ttl_secs),
                Err(e) => tracing::warn!("Redis set error: {}", e),
            }
        }
    }

    pub async fn ping(&self) -> bool {
        if let Some(mut redis) = self.redis.clone() {
            redis::cmd("PING")
                .query_async::<_, String>(&mut redis)
                .await
                .is_ok()
        } else {
            false
        }
    }
}
