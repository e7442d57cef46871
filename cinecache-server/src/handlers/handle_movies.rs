use axum::{
    Json,
    extract::{Path, Query, State},
};
use cinecache_core::{ChannelMovieRecord, MovieRecord};
use serde::Deserialize;

use super::{LanguageQuery, resolve_language};
use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct ChannelMovieQuery {
    pub title: Option<String>,
    pub language: Option<String>,
}

/// Movie detail by TMDB id
pub async fn get_movie_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<MovieRecord>> {
    let movie = state.metadata.movie(id, query.language()).await?;
    Ok(Json(movie))
}

/// Movie a channel is showing, looked up by title
pub async fn get_channel_movie_handler(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(query): Query<ChannelMovieQuery>,
) -> AppResult<Json<ChannelMovieRecord>> {
    let title = query
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::bad_request("title is required"))?;

    let record = state
        .metadata
        .movie_for_channel(
            &channel_id,
            title,
            resolve_language(query.language.as_deref()),
        )
        .await?;
    Ok(Json(record))
}
