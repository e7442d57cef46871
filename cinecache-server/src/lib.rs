//! # Cinecache Server
//!
//! Read-through caching proxy in front of the TMDB metadata API.
//!
//! Lookups are answered from the record store while fresh and re-fetched
//! from TMDB otherwise. The server also issues short-lived signed links for
//! an external media proxy.
//!
//! The server is built on Axum and uses:
//! - Redis or an in-process map as the record store backend
//! - TMDB v3 as the upstream catalog
//! - HMAC-SHA256 for stream link signatures

pub mod handlers;
pub mod infra;
pub mod routes;
pub mod stream;

pub use infra::app_state::AppState;

use axum::{Router, http::HeaderValue};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Full application router with CORS and request tracing applied.
pub fn build_app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state);

    Router::new()
        .merge(routes::create_api_router())
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Permissive in dev, allow-list otherwise
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let config = state.config();
    if config.dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new().allow_origin(allow_origin)
}
