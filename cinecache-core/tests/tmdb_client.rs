//! TMDB client against a throwaway local upstream.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use cinecache_core::providers::{MetadataSource, ProviderError, TmdbClient};
use serde_json::json;

const API_KEY: &str = "test-key";

async fn movie(
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if params.get("api_key").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status_code": 7, "status_message": "Invalid API key"})),
        );
    }
    if params.get("append_to_response").map(String::as_str) != Some("credits") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status_message": "credits not requested"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "title": "Inception",
            "overview": null,
            "release_date": "2010-07-15",
            "poster_path": "/inception.jpg",
            "genres": [{"id": 28, "name": "Action"}],
            "vote_average": 8.4,
            "vote_count": 1000,
            "language_echo": params.get("language"),
            "credits": {
                "cast": [{"id": 6193, "name": "Leonardo DiCaprio", "order": 0}],
                "crew": [{"id": 525, "name": "Christopher Nolan", "job": "Director"}]
            }
        })),
    )
}

async fn series_missing() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })),
    )
}

async fn search_tv() -> impl IntoResponse {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"status_message": "slow down"})),
    )
}

async fn search_movie(
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    Json(json!({
        "page": 1,
        "total_results": 1,
        "results": [{
            "id": 27205,
            "title": params.get("query"),
            "vote_average": 8.4,
            "vote_count": 1000
        }]
    }))
}

async fn season() -> impl IntoResponse {
    Json(json!({
        "id": 3624,
        "season_number": 1,
        "episodes": [
            {"id": 63056, "episode_number": 1, "name": "Winter Is Coming"},
            {"broken": true}
        ]
    }))
}

async fn episode_garbled() -> impl IntoResponse {
    (StatusCode::OK, "<html>maintenance</html>")
}

async fn server_error() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"status_message": "Service offline"})),
    )
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({}))
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/movie/{id}", get(movie))
        .route("/tv/404", get(series_missing))
        .route("/tv/503", get(server_error))
        .route("/tv/1399/season/1", get(season))
        .route("/tv/1399/season/1/episode/1", get(episode_garbled))
        .route("/tv/1399/season/9/episode/1", get(slow))
        .route("/search/movie", get(search_movie))
        .route("/search/tv", get(search_tv));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake upstream");
    });
    format!("http://{addr}/")
}

fn client(base_url: &str, api_key: &str) -> TmdbClient {
    TmdbClient::new(api_key, base_url, Duration::from_millis(500))
        .expect("client")
}

#[tokio::test]
async fn movie_detail_requests_credits() {
    let base = spawn_upstream().await;
    let movie = client(&base, API_KEY)
        .fetch_movie(27205, "en")
        .await
        .unwrap();

    assert_eq!(movie.id, 27205);
    assert_eq!(movie.overview, None);
    let credits = movie.credits.unwrap();
    assert_eq!(credits.crew[0].job, "Director");
    assert_eq!(credits.cast[0].name, "Leonardo DiCaprio");
}

#[tokio::test]
async fn upstream_statuses_map_to_provider_errors() {
    let base = spawn_upstream().await;
    let tmdb = client(&base, API_KEY);

    let unauthorized = client(&base, "wrong").fetch_movie(1, "en").await;
    assert!(matches!(unauthorized, Err(ProviderError::InvalidApiKey)));

    let missing = tmdb.fetch_series(404, "en").await;
    assert!(matches!(missing, Err(ProviderError::NotFound)));

    let limited = tmdb.search_series("got", "en").await;
    assert!(matches!(limited, Err(ProviderError::RateLimited)));

    match tmdb.fetch_series(503, "en").await {
        Err(ProviderError::ApiError(message)) => {
            assert_eq!(message, "Service offline")
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn search_sends_query_and_parses_results() {
    let base = spawn_upstream().await;
    let page = client(&base, API_KEY)
        .search_movies("Heat & Dust", "fr")
        .await
        .unwrap();

    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].title, "Heat & Dust");
}

#[tokio::test]
async fn season_detail_keeps_raw_episodes() {
    let base = spawn_upstream().await;
    let season = client(&base, API_KEY)
        .fetch_season_detail(1399, 1, "en")
        .await
        .unwrap();

    assert_eq!(season.episodes.len(), 2);
    let episodes = cinecache_core::reshape::episodes_from_season(season.episodes);
    assert_eq!(episodes.len(), 1);
}

#[tokio::test]
async fn garbled_body_is_a_parse_error() {
    let base = spawn_upstream().await;
    let result = client(&base, API_KEY)
        .fetch_episode_detail(1399, 1, 1, "en")
        .await;
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let base = spawn_upstream().await;
    let result = client(&base, API_KEY)
        .fetch_episode_detail(1399, 9, 1, "en")
        .await;
    assert!(matches!(result, Err(ProviderError::NetworkError(_))));
}
