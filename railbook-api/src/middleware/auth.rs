use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{error::AppError, state::AppState};

/// Gate for protected routes.
///
/// A missing (or non-Bearer) `Authorization` header yields 401, a token that fails
/// signature or expiry checks yields 403. On success the verified
/// [`railbook_core::Claims`] are placed in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req.headers().typed_get::<Authorization<Bearer>>();

    let claims = state.auth.verify(bearer.as_ref().map(|b| b.token()))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
