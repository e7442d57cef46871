use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
    stream::SignedStream,
};

#[derive(Debug, Deserialize)]
pub struct SignStreamRequest {
    pub url: String,
    /// Requested lifetime; capped at the configured link TTL.
    pub ttl_seconds: Option<u64>,
    /// Skip redirect resolution and sign `url` as given.
    #[serde(default)]
    pub skip_resolve: bool,
}

#[derive(Debug, Deserialize)]
pub struct OpenStreamQuery {
    pub url: String,
    pub expires: i64,
    pub signature: String,
}

/// Resolve redirects and issue a signed media proxy link
pub async fn sign_stream_handler(
    State(state): State<AppState>,
    Json(request): Json<SignStreamRequest>,
) -> AppResult<Json<SignedStream>> {
    let max_ttl = state.config().stream.link_ttl;
    let ttl = match request.ttl_seconds {
        Some(0) => {
            return Err(AppError::bad_request("ttl_seconds must be positive"));
        }
        Some(seconds) => Duration::from_secs(seconds).min(max_ttl),
        None => max_ttl,
    };

    let target = if request.skip_resolve {
        request.url
    } else {
        state.resolver.resolve(&request.url).await?.into()
    };

    let now = chrono::Utc::now().timestamp();
    let signed = state.signer.sign(&target, ttl, now)?;
    info!(stream_url = %signed.target, expires = signed.expires, "stream link issued");
    Ok(Json(signed))
}

/// Verify a signed link and redirect to its target
pub async fn open_stream_handler(
    State(state): State<AppState>,
    Query(query): Query<OpenStreamQuery>,
) -> AppResult<Redirect> {
    state.signer.verify(
        &query.url,
        query.expires,
        &query.signature,
        chrono::Utc::now().timestamp(),
    )?;
    Ok(Redirect::temporary(query.url.trim()))
}
