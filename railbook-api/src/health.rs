use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<AppState>) -> Response {
    match state.health.ping().await {
        Ok(()) => Json(json!({ "status": "ok", "database": "connected" })).into_response(),
        Err(err) => {
            tracing::warn!("Health check failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "database": "disconnected",
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}
