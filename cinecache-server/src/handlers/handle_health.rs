use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::warn;

use crate::infra::app_state::AppState;

/// Reports `degraded` while the store is unreachable; lookups still answer
/// from upstream in that state.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let backend = state.metadata.store().backend_kind();
    let (status, store) = match state.metadata.ping().await {
        Ok(()) => ("ok", json!({ "status": "ok", "type": backend })),
        Err(err) => {
            warn!(error = %err, "store health check failed");
            (
                "degraded",
                json!({
                    "status": "unavailable",
                    "type": backend,
                    "error": err.to_string(),
                }),
            )
        }
    };

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": { "store": store },
    }))
}
