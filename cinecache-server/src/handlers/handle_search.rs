use axum::{
    Json,
    extract::{OriginalUri, Query, State},
};
use cinecache_core::{MovieSearchRecord, SeriesSearchRecord};
use serde::Deserialize;

use super::resolve_language;
use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub language: Option<String>,
}

impl SearchQuery {
    fn terms(&self) -> AppResult<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or_else(|| AppError::bad_request("query is required"))
    }
}

/// Cached movie search. The inbound URL keys the cached response.
pub async fn search_movies_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<MovieSearchRecord>> {
    let results = state
        .metadata
        .search_movies(
            &uri.to_string(),
            params.terms()?,
            resolve_language(params.language.as_deref()),
        )
        .await?;
    Ok(Json(results))
}

pub async fn search_series_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SeriesSearchRecord>> {
    let results = state
        .metadata
        .search_series(
            &uri.to_string(),
            params.terms()?,
            resolve_language(params.language.as_deref()),
        )
        .await?;
    Ok(Json(results))
}
