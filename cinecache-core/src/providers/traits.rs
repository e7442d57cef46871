use async_trait::async_trait;
use thiserror::Error;

use super::types::{
    TmdbEpisode, TmdbMovie, TmdbMovieResult, TmdbPage, TmdbSeasonDetail,
    TmdbSeries,
};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Upstream catalog the cache reads through to.
///
/// Implementations never retry; a failure is reported once and the caller
/// decides what to serve.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Movie detail with credits appended.
    async fn fetch_movie(
        &self,
        id: u64,
        language: &str,
    ) -> Result<TmdbMovie, ProviderError>;

    async fn fetch_series(
        &self,
        id: u64,
        language: &str,
    ) -> Result<TmdbSeries, ProviderError>;

    async fn fetch_season_detail(
        &self,
        series_id: u64,
        season_number: u32,
        language: &str,
    ) -> Result<TmdbSeasonDetail, ProviderError>;

    async fn fetch_episode_detail(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
        language: &str,
    ) -> Result<TmdbEpisode, ProviderError>;

    async fn search_movies(
        &self,
        query: &str,
        language: &str,
    ) -> Result<TmdbPage<TmdbMovieResult>, ProviderError>;

    async fn search_series(
        &self,
        query: &str,
        language: &str,
    ) -> Result<TmdbPage<TmdbSeries>, ProviderError>;
}
