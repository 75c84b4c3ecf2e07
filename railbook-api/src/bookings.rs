use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use railbook_core::{pnr, Claims, ReservationRequest};
use railbook_shared::Booking;
use serde::Serialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
struct ReservationResponse {
    message: &'static str,
    booking: Booking,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reservations", post(create_reservation))
        .route("/api/bookings", get(list_bookings))
        .route("/api/bookings/{pnr}", get(get_booking))
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<Json<ReservationResponse>, AppError> {
    let Json(req) = payload?;
    let booking = state.bookings.reserve(claims.id, &req).await?;

    Ok(Json(ReservationResponse {
        message: "Reservation successful",
        booking,
    }))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_for_user(claims.id).await?))
}

/// Only the owner can look a booking up; someone else's PNR reads as not found.
async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(code): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let code = pnr::normalize(&code);
    if !pnr::is_well_formed(&code) {
        return Err(AppError::NotFoundError("Booking not found".to_string()));
    }

    state
        .bookings
        .find_by_pnr(claims.id, &code)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))
}
