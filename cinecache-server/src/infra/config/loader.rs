use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use cinecache_core::{
    freshness::DEFAULT_STALE_AFTER, keys::DEFAULT_CREDENTIAL_PARAM,
    providers::tmdb::{DEFAULT_TIMEOUT, TMDB_V3_BASE},
    store::DEFAULT_TTL,
};

use super::{
    models::{
        CacheConfig, Config, ConfigMetadata, CorsConfig,
        DEFAULT_STREAM_SIGNING_KEY, RedisConfig, ServerConfig, StreamConfig,
        TmdbConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["cinecache.toml", "config/cinecache.toml"];

pub const DEFAULT_MEDIA_PROXY_URL: &str = "http://localhost:3001/stream";
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Use these values instead of reading the process environment.
    pub env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = self
            .options
            .env
            .clone()
            .unwrap_or_else(EnvConfig::gather);

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = self.compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = if let Some(explicit) = &self.options.config_path
        {
            (Some(explicit.clone()), true)
        } else if let Some(from_env) = &env_config.config_path {
            (Some(from_env.clone()), true)
        } else {
            let found = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists());
            (found, false)
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if file_config.is_none() {
            warnings.push_with_hint(
                "No cinecache.toml detected; falling back to environment variables",
                "Create cinecache.toml or point CINECACHE_CONFIG at a configuration file",
            );
        }

        let FileConfig {
            server: file_server,
            redis: file_redis,
            tmdb: file_tmdb,
            cache: file_cache,
            stream: file_stream,
            cors: file_cors,
            dev_mode: file_dev_mode,
        } = file_config.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.server_port.or(file_server.port).unwrap_or(3000),
        };

        let redis = env
            .redis_url
            .map(|url| RedisConfig { url })
            .or_else(|| file_redis.map(|r| RedisConfig { url: r.url }))
            .filter(|redis| !redis.url.trim().is_empty());

        let tmdb = TmdbConfig {
            api_key: env
                .tmdb_api_key
                .or(file_tmdb.api_key)
                .unwrap_or_default(),
            base_url: env
                .tmdb_base_url
                .or(file_tmdb.base_url)
                .unwrap_or_else(|| TMDB_V3_BASE.to_string()),
            timeout: resolve_duration(
                "TMDB_TIMEOUT",
                env.tmdb_timeout.or(file_tmdb.timeout),
                DEFAULT_TIMEOUT,
            )?,
        };

        let cache = CacheConfig {
            ttl: resolve_duration(
                "CACHE_TTL",
                env.cache_ttl.or(file_cache.ttl),
                DEFAULT_TTL,
            )?,
            stale_after: resolve_duration(
                "CACHE_STALE_AFTER",
                env.cache_stale_after.or(file_cache.stale_after),
                DEFAULT_STALE_AFTER,
            )?,
            credential_param: env
                .cache_credential_param
                .or(file_cache.credential_param)
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_PARAM.to_string()),
        };

        let stream = StreamConfig {
            signing_key: env
                .stream_signing_key
                .or(file_stream.signing_key)
                .unwrap_or_else(|| DEFAULT_STREAM_SIGNING_KEY.to_string()),
            media_proxy_url: env
                .media_proxy_url
                .or(file_stream.media_proxy_url)
                .unwrap_or_else(|| DEFAULT_MEDIA_PROXY_URL.to_string()),
            link_ttl: resolve_duration(
                "STREAM_LINK_TTL",
                env.stream_link_ttl.or(file_stream.link_ttl),
                DEFAULT_LINK_TTL,
            )?,
            resolve_timeout: resolve_duration(
                "STREAM_RESOLVE_TIMEOUT",
                env.stream_resolve_timeout.or(file_stream.resolve_timeout),
                DEFAULT_RESOLVE_TIMEOUT,
            )?,
        };

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .or(file_cors.allowed_origins)
                .unwrap_or_default(),
        };

        let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

        let config = Config {
            server,
            redis,
            tmdb,
            cache,
            stream,
            cors,
            dev_mode,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        let guard_warnings = validation::apply_guard_rails(&config)?;
        warnings.extend(guard_warnings);

        Ok((config, warnings))
    }
}

fn resolve_duration(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    humantime::parse_duration(raw.trim()).map_err(|source| {
        ConfigLoadError::InvalidDuration {
            field,
            value: raw,
            source,
        }
    })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid duration for {field}: `{value}`")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoad {
    pub fn config_path(&self) -> Option<&Path> {
        self.config.metadata.config_path.as_deref()
    }
}
