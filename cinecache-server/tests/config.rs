use std::{fs, path::PathBuf, time::Duration};

use cinecache_server::infra::config::{
    ConfigGuardRailError, ConfigLoadError, ConfigLoader, EnvConfig,
};
use tempfile::TempDir;

const STRONG_KEY: &str = "f3c9a1d27b8e4f6a9c0d1e2f3a4b5c6d";

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("cinecache.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn loader(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::new().with_env_file(dir.path().join("missing.env"))
}

#[test]
fn file_values_are_overridden_by_environment() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
            [server]
            host = "127.0.0.1"
            port = 4000

            [redis]
            url = "redis://cache.internal:6379"

            [tmdb]
            api_key = "from-file"
            timeout = "2s"

            [cache]
            ttl = "60days"
            stale_after = "7days"

            [stream]
            signing_key = "{STRONG_KEY}"
            media_proxy_url = "https://media.example/stream"
            link_ttl = "90m"
            "#
        ),
    );

    let load = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig {
            server_port: Some(8080),
            tmdb_api_key: Some("from-env".into()),
            ..Default::default()
        })
        .load()
        .unwrap();
    let config = load.config;

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.tmdb.api_key, "from-env");
    assert_eq!(config.tmdb.timeout, Duration::from_secs(2));
    assert_eq!(config.cache.ttl, Duration::from_secs(60 * 24 * 60 * 60));
    assert_eq!(config.cache.stale_after, Duration::from_secs(7 * 24 * 60 * 60));
    assert_eq!(config.cache.credential_param, "api_key");
    assert_eq!(config.stream.link_ttl, Duration::from_secs(90 * 60));
    assert_eq!(config.stream.resolve_timeout, Duration::from_secs(5));
    assert_eq!(
        config.redis.as_ref().map(|redis| redis.url.as_str()),
        Some("redis://cache.internal:6379")
    );
    assert!(!config.dev_mode);
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
    assert!(!config.metadata.env_file_loaded);
    assert!(load.warnings.is_empty());
}

#[test]
fn missing_pieces_produce_warnings() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        dev_mode = true

        [cache]
        ttl = "1day"
        stale_after = "2days"
        "#,
    );

    let load = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig::default())
        .load()
        .unwrap();
    let messages: Vec<&str> = load
        .warnings
        .iter()
        .map(|warning| warning.message.as_str())
        .collect();

    assert!(load.config.stream.is_default_signing_key());
    assert!(load.config.redis.is_none());
    assert!(messages.iter().any(|m| m.contains("STREAM_SIGNING_KEY")));
    assert!(messages.iter().any(|m| m.contains("REDIS_URL")));
    assert!(messages.iter().any(|m| m.contains("TMDB_API_KEY")));
    assert!(messages.iter().any(|m| m.contains("CACHE_TTL")));
    assert!(load.warnings.iter().all(|warning| warning.hint.is_some()));
}

#[test]
fn default_signing_key_is_rejected_outside_dev_mode() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "dev_mode = false\n");

    let err = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig::default())
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::WeakSecret { .. })
    ));

    let err = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig {
            stream_signing_key: Some("too-short".into()),
            ..Default::default()
        })
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::WeakSecret { .. })
    ));
}

#[test]
fn cors_wildcard_needs_dev_mode() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let env = EnvConfig {
        stream_signing_key: Some(STRONG_KEY.into()),
        cors_allowed_origins: Some(vec!["*".into()]),
        ..Default::default()
    };

    let err = loader(&dir)
        .with_config_path(&path)
        .with_env(env.clone())
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::DangerousCorsWildcard)
    ));

    let load = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig {
            dev_mode: Some(true),
            ..env
        })
        .load()
        .unwrap();
    assert!(load.config.cors.is_wildcard_included());
}

#[test]
fn malformed_values_are_load_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "dev_mode = true\n");

    let err = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig {
            cache_ttl: Some("forever".into()),
            ..Default::default()
        })
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::InvalidDuration { field: "CACHE_TTL", .. }
    ));

    let err = loader(&dir)
        .with_config_path(&path)
        .with_env(EnvConfig {
            media_proxy_url: Some("ftp://media.example/stream".into()),
            ..Default::default()
        })
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(
            ConfigGuardRailError::InvalidMediaProxyUrl { .. }
        )
    ));

    let broken = write_config(&dir, "[server\nport = 1");
    let err = loader(&dir)
        .with_config_path(&broken)
        .with_env(EnvConfig::default())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();

    let err = loader(&dir)
        .with_config_path(dir.path().join("nope.toml"))
        .with_env(EnvConfig::default())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));

    let err = loader(&dir)
        .with_env(EnvConfig {
            config_path: Some(dir.path().join("nope.toml")),
            ..Default::default()
        })
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn environment_alone_is_enough() {
    let dir = TempDir::new().unwrap();

    let load = loader(&dir)
        .with_env(EnvConfig {
            dev_mode: Some(true),
            tmdb_api_key: Some("from-env".into()),
            ..Default::default()
        })
        .load()
        .unwrap();

    assert_eq!(load.config.server.port, 3000);
    assert_eq!(load.config.tmdb.base_url, "https://api.themoviedb.org/3");
    assert!(load.config_path().is_none());
    assert!(
        load.warnings
            .iter()
            .any(|warning| warning.message.contains("No cinecache.toml"))
    );
}
