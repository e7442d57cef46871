use std::sync::Arc;

use anyhow::Context;
use cinecache_core::{
    FreshnessPolicy, KeyCodec, MetadataService, RecordStore,
    backend::{KvBackend, MemoryBackend, RedisBackend},
    providers::{MetadataSource, TmdbClient},
};
use tracing::info;
use url::Url;

use crate::infra::{app_state::AppState, config::Config};
use crate::stream::{RedirectResolver, StreamSigner};

/// Redis when a URL is configured, otherwise the in-process backend.
pub fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn KvBackend>> {
    match &config.redis {
        Some(redis) => {
            let backend = RedisBackend::open(&redis.url)
                .context("invalid REDIS_URL")?;
            info!("using redis cache backend");
            Ok(Arc::new(backend))
        }
        None => {
            info!("using in-memory cache backend");
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}

pub fn build_tmdb_client(
    config: &Config,
) -> anyhow::Result<Arc<dyn MetadataSource>> {
    let client = TmdbClient::new(
        config.tmdb.api_key.clone(),
        config.tmdb.base_url.clone(),
        config.tmdb.timeout,
    )
    .context("failed to build TMDB client")?;
    Ok(Arc::new(client))
}

/// Wire the metadata service and stream signer around the given backend and
/// upstream client.
pub fn build_state(
    config: Config,
    backend: Arc<dyn KvBackend>,
    source: Arc<dyn MetadataSource>,
) -> anyhow::Result<AppState> {
    let store = RecordStore::new(backend, config.cache.ttl);
    let metadata = MetadataService::new(store, source)
        .with_policy(FreshnessPolicy::new(config.cache.stale_after))
        .with_key_codec(KeyCodec::new(config.cache.credential_param.clone()));

    let media_proxy_url = Url::parse(&config.stream.media_proxy_url)
        .context("invalid MEDIA_PROXY_URL")?;
    let signer =
        StreamSigner::new(config.stream.signing_key.as_bytes(), media_proxy_url)
            .context("invalid STREAM_SIGNING_KEY")?;
    let resolver = RedirectResolver::new(config.stream.resolve_timeout)
        .context("failed to build redirect resolver")?;

    Ok(AppState::new(metadata, signer, resolver, config))
}
