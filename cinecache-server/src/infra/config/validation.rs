use thiserror::Error;
use url::Url;

use super::models::{Config, StreamConfig};

/// Shortest signing key accepted outside dev mode.
pub const MIN_SIGNING_KEY_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("stream secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("invalid MEDIA_PROXY_URL `{value}`: {reason}")]
    InvalidMediaProxyUrl { value: String, reason: String },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    validate_media_proxy_url(&config.stream.media_proxy_url)?;
    enforce_signing_key(&config.stream, config.dev_mode, &mut warnings)?;

    if !config.dev_mode && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard);
    }

    if config.redis.is_none() {
        warnings.push_with_hint(
            "REDIS_URL not configured; using the in-process cache, which is lost on restart",
            "Set REDIS_URL to share the cache across restarts and instances",
        );
    }

    if config.tmdb.api_key.trim().is_empty() {
        warnings.push_with_hint(
            "TMDB_API_KEY not set; every cache miss will fail upstream",
            "Create an API key at https://www.themoviedb.org/settings/api",
        );
    }

    if config.cache.ttl < config.cache.stale_after {
        warnings.push_with_hint(
            "CACHE_TTL is shorter than CACHE_STALE_AFTER; records expire before they turn stale",
            "Raise CACHE_TTL or lower CACHE_STALE_AFTER",
        );
    }

    Ok(warnings)
}

fn enforce_signing_key(
    stream: &StreamConfig,
    dev_mode: bool,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if stream.is_default_signing_key() {
        if dev_mode {
            warnings.push_with_hint(
                "STREAM_SIGNING_KEY not set; using the development placeholder",
                "Set STREAM_SIGNING_KEY before exposing the stream endpoints",
            );
            return Ok(());
        }
        return Err(ConfigGuardRailError::WeakSecret {
            field: "STREAM_SIGNING_KEY",
            reason: "uses the default placeholder value".into(),
        });
    }

    if !dev_mode && stream.signing_key.len() < MIN_SIGNING_KEY_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "STREAM_SIGNING_KEY",
            reason: format!(
                "must be at least {MIN_SIGNING_KEY_LENGTH} characters"
            ),
        });
    }

    Ok(())
}

fn validate_media_proxy_url(raw: &str) -> Result<(), ConfigGuardRailError> {
    let invalid = |reason: String| ConfigGuardRailError::InvalidMediaProxyUrl {
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.query().is_some() {
        return Err(invalid("must not carry a query string".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_url_must_be_plain_http() {
        assert!(validate_media_proxy_url("https://media.example/stream").is_ok());
        assert!(matches!(
            validate_media_proxy_url("ftp://media.example/stream"),
            Err(ConfigGuardRailError::InvalidMediaProxyUrl { .. })
        ));
        assert!(validate_media_proxy_url("not a url").is_err());
        assert!(validate_media_proxy_url("http://m.example/s?x=1").is_err());
    }
}
