use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
///
/// Durations are humantime strings such as `"30days"` or `"750ms"`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    pub redis: Option<FileRedisConfig>,
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    #[serde(default)]
    pub cache: FileCacheConfig,
    #[serde(default)]
    pub stream: FileStreamConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileRedisConfig {
    pub url: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_param: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStreamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_proxy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub redis_url: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub tmdb_timeout: Option<String>,
    pub cache_ttl: Option<String>,
    pub cache_stale_after: Option<String>,
    pub cache_credential_param: Option<String>,
    pub stream_signing_key: Option<String>,
    pub media_proxy_url: Option<String>,
    pub stream_link_ttl: Option<String>,
    pub stream_resolve_timeout: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("CINECACHE_CONFIG")
                .ok()
                .map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            redis_url: non_empty_var("REDIS_URL"),
            tmdb_api_key: non_empty_var("TMDB_API_KEY"),
            tmdb_base_url: non_empty_var("TMDB_BASE_URL"),
            tmdb_timeout: non_empty_var("TMDB_TIMEOUT"),
            cache_ttl: non_empty_var("CACHE_TTL"),
            cache_stale_after: non_empty_var("CACHE_STALE_AFTER"),
            cache_credential_param: non_empty_var("CACHE_CREDENTIAL_PARAM"),
            stream_signing_key: non_empty_var("STREAM_SIGNING_KEY"),
            media_proxy_url: non_empty_var("MEDIA_PROXY_URL"),
            stream_link_ttl: non_empty_var("STREAM_LINK_TTL"),
            stream_resolve_timeout: non_empty_var("STREAM_RESOLVE_TIMEOUT"),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
            dev_mode: parse_bool_var("DEV_MODE"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| split_csv(&raw))
}

pub(crate) fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_bool_var(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|raw| parse_bool(&raw))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_values_are_trimmed_and_compacted() {
        assert_eq!(
            split_csv(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn file_config_parses_partial_tables() {
        let parsed: FileConfig = toml::from_str(
            r#"
            dev_mode = true

            [tmdb]
            timeout = "2s"

            [stream]
            media_proxy_url = "https://media.example/stream"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.dev_mode, Some(true));
        assert_eq!(parsed.tmdb.timeout.as_deref(), Some("2s"));
        assert!(parsed.redis.is_none());
        assert!(parsed.cache.ttl.is_none());
    }
}
