use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use railbook_shared::Train;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/trains", get(list_trains))
        .route("/api/trains/{id}", get(get_train))
}

async fn list_trains(State(state): State<AppState>) -> Result<Json<Vec<Train>>, AppError> {
    Ok(Json(state.trains.list_trains().await?))
}

async fn get_train(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Train>, AppError> {
    state
        .trains
        .get_train(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("Train not found".to_string()))
}
