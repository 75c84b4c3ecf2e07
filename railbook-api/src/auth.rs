use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use railbook_core::{AuthSession, Claims};
use railbook_shared::Masked;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: Masked<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: Masked<String>,
}

#[derive(Debug, Serialize)]
struct TokenUser {
    id: i64,
    email: String,
}

#[derive(Debug, Serialize)]
struct VerifyTokenResponse {
    message: &'static str,
    user: TokenUser,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes that sit behind `require_auth`.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/verify-token", get(verify_token))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    let Json(req) = payload?;
    let session = state
        .auth
        .register(&req.name, &req.email, req.password.expose())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthSession>, AppError> {
    let Json(req) = payload?;
    let session = state.auth.login(&req.email, req.password.expose()).await?;
    Ok(Json(session))
}

async fn verify_token(Extension(claims): Extension<Claims>) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        message: "Token is valid",
        user: TokenUser {
            id: claims.id,
            email: claims.email,
        },
    })
}
