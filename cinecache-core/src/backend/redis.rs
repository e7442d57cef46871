use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::KvBackend;
use crate::error::BackendError;

/// Reconnect attempts before an operation reports the store as unavailable.
pub const CONNECT_RETRIES: usize = 1;
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection settings that give up quickly, so an outage turns into cache
/// misses instead of slow lookups.
pub fn connection_config() -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(CONNECT_RETRIES)
        .set_connection_timeout(Some(CONNECT_TIMEOUT))
        .set_response_timeout(Some(RESPONSE_TIMEOUT))
}

/// Redis-backed store connection.
///
/// The value is created once per process and shared. The underlying
/// connection manager is established on first use; a failed connect leaves
/// the cell empty so the next operation tries again.
pub struct RedisBackend {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("connected", &self.conn.initialized())
            .finish()
    }
}

impl RedisBackend {
    pub fn open(redis_url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, BackendError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                info!("Connecting to Redis cache");
                let manager = ConnectionManager::new_with_config(
                    self.client.clone(),
                    connection_config(),
                )
                .await?;
                info!("Successfully connected to Redis cache");
                Ok::<_, BackendError>(manager)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        debug!("Cache GET: {}", key);
        let mut conn = self.connection().await?;
        let data: Option<Vec<u8>> = conn.get(key).await?;
        Ok(data)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> Result<(), BackendError> {
        debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn unreachable_server_fails_fast() {
        // Nothing listens on the discard port.
        let backend = RedisBackend::open("redis://127.0.0.1:9/").unwrap();

        let started = Instant::now();
        let err = backend.get("movie:id:1:en").await;

        assert!(err.is_err());
        assert!(!backend.conn.initialized());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
