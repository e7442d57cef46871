//! Flat key-value backends the record store is layered on.

use async_trait::async_trait;

use crate::error::BackendError;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryBackend;
#[cfg(feature = "redis")]
pub use self::redis::RedisBackend;

/// Minimal byte-oriented contract of the cache backend.
///
/// Atomicity is only guaranteed per single-key write.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> Result<(), BackendError>;

    async fn ping(&self) -> Result<(), BackendError>;

    /// Short backend label for logs and health output.
    fn kind(&self) -> &'static str;
}
