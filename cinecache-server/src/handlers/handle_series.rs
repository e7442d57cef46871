use axum::{
    Json,
    extract::{Path, Query, State},
};
use cinecache_core::{EpisodeRecord, SeasonRecord, SeriesRecord};

use super::LanguageQuery;
use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn get_series_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<SeriesRecord>> {
    let series = state.metadata.series(id, query.language()).await?;
    Ok(Json(series))
}

pub async fn get_seasons_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<Vec<SeasonRecord>>> {
    let seasons = state.metadata.seasons(id, query.language()).await?;
    Ok(Json(seasons))
}

/// Episode list of one season
pub async fn get_season_episodes_handler(
    State(state): State<AppState>,
    Path((id, season)): Path<(u64, u32)>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<Vec<EpisodeRecord>>> {
    let episodes = state
        .metadata
        .season_episodes(id, season, query.language())
        .await?;
    Ok(Json(episodes))
}

/// Episode detail including guest stars
pub async fn get_episode_handler(
    State(state): State<AppState>,
    Path((id, season, episode)): Path<(u64, u32, u32)>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<EpisodeRecord>> {
    let episode = state
        .metadata
        .episode(id, season, episode, query.language())
        .await?;
    Ok(Json(episode))
}
