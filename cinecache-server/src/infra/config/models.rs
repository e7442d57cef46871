use std::{fmt, path::PathBuf, time::Duration};

/// Placeholder signing key used when none is configured. Accepted only in
/// dev mode.
pub const DEFAULT_STREAM_SIGNING_KEY: &str =
    "cinecache-dev-stream-signing-key-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: Option<RedisConfig>,
    pub tmdb: TmdbConfig,
    pub cache: CacheConfig,
    pub stream: StreamConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key_set", &!self.api_key.is_empty())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backend TTL, re-armed on every write.
    pub ttl: Duration,
    pub stale_after: Duration,
    /// Query parameter stripped from derived cache keys.
    pub credential_param: String,
}

#[derive(Clone)]
pub struct StreamConfig {
    pub signing_key: String,
    pub media_proxy_url: String,
    pub link_ttl: Duration,
    /// Per-hop timeout while resolving redirects before signing.
    pub resolve_timeout: Duration,
}

impl StreamConfig {
    pub fn is_default_signing_key(&self) -> bool {
        self.signing_key == DEFAULT_STREAM_SIGNING_KEY
    }
}

impl fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConfig")
            .field("signing_key", &"<redacted>")
            .field("media_proxy_url", &self.media_proxy_url)
            .field("link_ttl", &self.link_ttl)
            .field("resolve_timeout", &self.resolve_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
