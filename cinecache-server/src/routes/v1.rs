use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{
        handle_health, handle_movies, handle_search, handle_series,
        handle_stream,
    },
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health::health_handler))
        .merge(create_search_routes())
        .merge(create_movie_routes())
        .merge(create_series_routes())
        .merge(create_stream_routes())
}

fn create_search_routes() -> Router<AppState> {
    Router::new()
        .route("/search/movie", get(handle_search::search_movies_handler))
        .route("/search/tv", get(handle_search::search_series_handler))
}

fn create_movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movie/{id}", get(handle_movies::get_movie_handler))
        .route(
            "/channel/{channel_id}/movie",
            get(handle_movies::get_channel_movie_handler),
        )
}

fn create_series_routes() -> Router<AppState> {
    Router::new()
        .route("/tv/{id}", get(handle_series::get_series_handler))
        .route("/tv/{id}/seasons", get(handle_series::get_seasons_handler))
        .route(
            "/tv/{id}/season/{season}",
            get(handle_series::get_season_episodes_handler),
        )
        .route(
            "/tv/{id}/season/{season}/episode/{episode}",
            get(handle_series::get_episode_handler),
        )
}

fn create_stream_routes() -> Router<AppState> {
    Router::new()
        .route("/stream/sign", post(handle_stream::sign_stream_handler))
        .route("/stream/open", get(handle_stream::open_stream_handler))
}
