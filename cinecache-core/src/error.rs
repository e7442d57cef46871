use thiserror::Error;

use crate::providers::ProviderError;

/// Failure reported by a key-value backend.
///
/// Callers in the read path treat every variant as a cache miss; callers in
/// the write path log it and continue.
#[derive(Error, Debug)]
pub enum BackendError {
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Failed to encode record for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
