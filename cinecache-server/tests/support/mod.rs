#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum_test::TestServer;
use cinecache_core::{
    BackendError,
    backend::{KvBackend, MemoryBackend},
    freshness::DEFAULT_STALE_AFTER,
    providers::{
        MetadataSource, ProviderError, TmdbCastMember, TmdbCredits,
        TmdbCrewMember, TmdbEpisode, TmdbGuestStar, TmdbMovie,
        TmdbMovieResult, TmdbPage, TmdbSeasonDetail, TmdbSeasonSummary,
        TmdbSeries, tmdb::TMDB_V3_BASE,
    },
    store::DEFAULT_TTL,
};
use cinecache_server::{
    AppState, build_app,
    infra::{
        config::{
            CacheConfig, Config, ConfigMetadata, CorsConfig, ServerConfig,
            StreamConfig, TmdbConfig,
        },
        startup,
    },
};

pub const SIGNING_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const MEDIA_PROXY_URL: &str = "https://media.example/stream";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        redis: None,
        tmdb: TmdbConfig {
            api_key: "test-key".into(),
            base_url: TMDB_V3_BASE.into(),
            timeout: Duration::from_secs(5),
        },
        cache: CacheConfig {
            ttl: DEFAULT_TTL,
            stale_after: DEFAULT_STALE_AFTER,
            credential_param: "api_key".into(),
        },
        stream: StreamConfig {
            signing_key: SIGNING_KEY.into(),
            media_proxy_url: MEDIA_PROXY_URL.into(),
            link_ttl: Duration::from_secs(3600),
            resolve_timeout: Duration::from_secs(2),
        },
        cors: CorsConfig::default(),
        dev_mode: true,
        metadata: ConfigMetadata::default(),
    }
}

pub fn test_state(source: Arc<StaticSource>, backend: Arc<dyn KvBackend>) -> AppState {
    startup::build_state(test_config(), backend, source).unwrap()
}

pub fn test_server(source: Arc<StaticSource>) -> TestServer {
    server_with_backend(source, Arc::new(MemoryBackend::new()))
}

pub fn server_with_backend(
    source: Arc<StaticSource>,
    backend: Arc<dyn KvBackend>,
) -> TestServer {
    TestServer::new(build_app(test_state(source, backend))).unwrap()
}

/// Backend whose every operation fails.
#[derive(Debug, Default)]
pub struct DownBackend;

#[async_trait]
impl KvBackend for DownBackend {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Err(BackendError::Unavailable("connection refused".into()))
    }

    async fn set(
        &self,
        _key: &str,
        _value: Vec<u8>,
        _ttl_seconds: u64,
    ) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".into()))
    }

    fn kind(&self) -> &'static str {
        "down"
    }
}

/// Canned upstream catalog that counts how often it is asked.
#[derive(Debug, Default)]
pub struct StaticSource {
    movies: HashMap<u64, TmdbMovie>,
    series: HashMap<u64, TmdbSeries>,
    seasons: HashMap<(u64, u32), TmdbSeasonDetail>,
    episodes: HashMap<(u64, u32, u32), TmdbEpisode>,
    movie_results: Vec<TmdbMovieResult>,
    series_results: Vec<TmdbSeries>,
    pub offline: AtomicBool,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn catalog() -> Self {
        Self::default()
            .with_movie(inception())
            .with_movie_result(TmdbMovieResult {
                id: 27205,
                title: "Inception".into(),
                vote_average: 8.4,
                vote_count: 1000,
                ..Default::default()
            })
            .with_series(breaking_bad())
            .with_series_result(TmdbSeries {
                id: 1396,
                name: "Breaking Bad".into(),
                genre_ids: vec![18],
                vote_average: 8.9,
                vote_count: 12000,
                ..Default::default()
            })
            .with_season(
                1396,
                TmdbSeasonDetail {
                    id: Some(3572),
                    season_number: 1,
                    episodes: vec![
                        serde_json::json!({"id": 62085, "episode_number": 1, "name": "Pilot"}),
                        serde_json::json!({"id": 62086, "episode_number": 2, "name": "Cat's in the Bag..."}),
                    ],
                },
            )
            .with_episode(
                1396,
                TmdbEpisode {
                    id: 62085,
                    episode_number: 1,
                    season_number: 1,
                    name: Some("Pilot".into()),
                    guest_stars: Some(vec![TmdbGuestStar {
                        id: 92495,
                        name: "John Koyama".into(),
                        character: Some("Emilio Koyama".into()),
                        ..Default::default()
                    }]),
                    ..Default::default()
                },
            )
    }

    pub fn with_movie(mut self, movie: TmdbMovie) -> Self {
        self.movies.insert(movie.id, movie);
        self
    }

    pub fn with_movie_result(mut self, hit: TmdbMovieResult) -> Self {
        self.movie_results.push(hit);
        self
    }

    pub fn with_series(mut self, series: TmdbSeries) -> Self {
        self.series.insert(series.id, series);
        self
    }

    pub fn with_series_result(mut self, hit: TmdbSeries) -> Self {
        self.series_results.push(hit);
        self
    }

    pub fn with_season(mut self, series_id: u64, detail: TmdbSeasonDetail) -> Self {
        self.seasons.insert((series_id, detail.season_number), detail);
        self
    }

    pub fn with_episode(mut self, series_id: u64, episode: TmdbEpisode) -> Self {
        self.episodes.insert(
            (series_id, episode.season_number, episode.episode_number),
            episode,
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn call(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProviderError::ApiError("Service offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataSource for StaticSource {
    async fn fetch_movie(
        &self,
        id: u64,
        _language: &str,
    ) -> Result<TmdbMovie, ProviderError> {
        self.call()?;
        self.movies.get(&id).cloned().ok_or(ProviderError::NotFound)
    }

    async fn fetch_series(
        &self,
        id: u64,
        _language: &str,
    ) -> Result<TmdbSeries, ProviderError> {
        self.call()?;
        self.series.get(&id).cloned().ok_or(ProviderError::NotFound)
    }

    async fn fetch_season_detail(
        &self,
        series_id: u64,
        season_number: u32,
        _language: &str,
    ) -> Result<TmdbSeasonDetail, ProviderError> {
        self.call()?;
        self.seasons
            .get(&(series_id, season_number))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_episode_detail(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
        _language: &str,
    ) -> Result<TmdbEpisode, ProviderError> {
        self.call()?;
        self.episodes
            .get(&(series_id, season_number, episode_number))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn search_movies(
        &self,
        query: &str,
        _language: &str,
    ) -> Result<TmdbPage<TmdbMovieResult>, ProviderError> {
        self.call()?;
        let results: Vec<_> = self
            .movie_results
            .iter()
            .filter(|hit| hit.title.eq_ignore_ascii_case(query))
            .cloned()
            .collect();
        Ok(TmdbPage {
            page: 1,
            total_results: results.len() as u64,
            results,
        })
    }

    async fn search_series(
        &self,
        query: &str,
        _language: &str,
    ) -> Result<TmdbPage<TmdbSeries>, ProviderError> {
        self.call()?;
        let results: Vec<_> = self
            .series_results
            .iter()
            .filter(|hit| hit.name.eq_ignore_ascii_case(query))
            .cloned()
            .collect();
        Ok(TmdbPage {
            page: 1,
            total_results: results.len() as u64,
            results,
        })
    }
}

pub fn inception() -> TmdbMovie {
    TmdbMovie {
        id: 27205,
        title: "Inception".into(),
        overview: Some("A thief who steals corporate secrets".into()),
        release_date: Some("2010-07-15".into()),
        poster_path: Some("/inception.jpg".into()),
        vote_average: 8.4,
        vote_count: 1000,
        credits: Some(TmdbCredits {
            cast: vec![TmdbCastMember {
                id: 6193,
                name: "Leonardo DiCaprio".into(),
                order: 0,
                ..Default::default()
            }],
            crew: vec![TmdbCrewMember {
                id: 525,
                name: "Christopher Nolan".into(),
                job: "Director".into(),
                ..Default::default()
            }],
        }),
        ..Default::default()
    }
}

pub fn breaking_bad() -> TmdbSeries {
    TmdbSeries {
        id: 1396,
        name: "Breaking Bad".into(),
        vote_average: 8.9,
        vote_count: 12000,
        created_by: Some(Vec::new()),
        number_of_episodes: Some(62),
        number_of_seasons: Some(5),
        seasons: Some(vec![TmdbSeasonSummary {
            id: 3572,
            season_number: 1,
            name: Some("Season 1".into()),
            episode_count: 7,
            ..Default::default()
        }]),
        ..Default::default()
    }
}
