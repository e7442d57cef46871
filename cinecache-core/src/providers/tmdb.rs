use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use super::traits::{MetadataSource, ProviderError};
use super::types::{
    TmdbEpisode, TmdbMovie, TmdbMovieResult, TmdbPage, TmdbSeasonDetail,
    TmdbSeries,
};

pub const TMDB_V3_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct DetailQuery<'a> {
    api_key: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    append_to_response: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    api_key: &'a str,
    query: &'a str,
    language: &'a str,
    include_adult: bool,
}

/// TMDB v3 client on plain reqwest.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("api_key_set", &!self.api_key.is_empty())
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cinecache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn detail_query<'a>(
        &'a self,
        language: &'a str,
        append_to_response: Option<&'a str>,
    ) -> DetailQuery<'a> {
        DetailQuery {
            api_key: &self.api_key,
            language,
            append_to_response,
        }
    }

    async fn get_tmdb_json<Q, T>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ProviderError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("TMDB GET: {}", path);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            return serde_json::from_slice::<T>(&body)
                .map_err(|err| ProviderError::ParseError(err.to_string()));
        }

        #[derive(Debug, Deserialize)]
        struct TmdbErrorBody {
            #[serde(default)]
            status_message: Option<String>,
        }

        let message = response
            .json::<TmdbErrorBody>()
            .await
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| {
                format!("TMDB request failed with status {}", status)
            });

        match status.as_u16() {
            401 => Err(ProviderError::InvalidApiKey),
            404 => Err(ProviderError::NotFound),
            429 => Err(ProviderError::RateLimited),
            _ => Err(ProviderError::ApiError(message)),
        }
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn fetch_movie(
        &self,
        id: u64,
        language: &str,
    ) -> Result<TmdbMovie, ProviderError> {
        let query = self.detail_query(language, Some("credits"));
        self.get_tmdb_json(&format!("/movie/{id}"), &query).await
    }

    async fn fetch_series(
        &self,
        id: u64,
        language: &str,
    ) -> Result<TmdbSeries, ProviderError> {
        let query = self.detail_query(language, None);
        self.get_tmdb_json(&format!("/tv/{id}"), &query).await
    }

    async fn fetch_season_detail(
        &self,
        series_id: u64,
        season_number: u32,
        language: &str,
    ) -> Result<TmdbSeasonDetail, ProviderError> {
        let query = self.detail_query(language, None);
        self.get_tmdb_json(
            &format!("/tv/{series_id}/season/{season_number}"),
            &query,
        )
        .await
    }

    async fn fetch_episode_detail(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
        language: &str,
    ) -> Result<TmdbEpisode, ProviderError> {
        let query = self.detail_query(language, None);
        self.get_tmdb_json(
            &format!(
                "/tv/{series_id}/season/{season_number}/episode/{episode_number}"
            ),
            &query,
        )
        .await
    }

    async fn search_movies(
        &self,
        query: &str,
        language: &str,
    ) -> Result<TmdbPage<TmdbMovieResult>, ProviderError> {
        let params = SearchQuery {
            api_key: &self.api_key,
            query,
            language,
            include_adult: false,
        };
        self.get_tmdb_json("/search/movie", &params).await
    }

    async fn search_series(
        &self,
        query: &str,
        language: &str,
    ) -> Result<TmdbPage<TmdbSeries>, ProviderError> {
        let params = SearchQuery {
            api_key: &self.api_key,
            query,
            language,
            include_adult: false,
        };
        self.get_tmdb_json("/search/tv", &params).await
    }
}
