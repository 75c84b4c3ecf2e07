use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use railbook_core::{AuthError, ReservationError, StoreError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::DuplicateEmail => AppError::ValidationError(err.to_string()),
            AuthError::InvalidCredentials | AuthError::MissingToken => {
                AppError::AuthenticationError(err.to_string())
            }
            AuthError::InvalidToken => AppError::AuthorizationError(err.to_string()),
            AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Store(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Validation(msg) => AppError::ValidationError(msg),
            ReservationError::TrainNotFound(_) => {
                AppError::NotFoundError("Train not found".to_string())
            }
            ReservationError::InsufficientSeats { .. } => {
                AppError::ValidationError("Not enough seats available".to_string())
            }
            ReservationError::Transaction(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_auth_errors_map_to_status_codes() {
        assert_eq!(status(AuthError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::InvalidToken), StatusCode::FORBIDDEN);
        assert_eq!(status(AuthError::DuplicateEmail), StatusCode::BAD_REQUEST);
        assert_eq!(status(AuthError::Hashing("boom".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(AuthError::Token("boom".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_reservation_errors_map_to_status_codes() {
        assert_eq!(status(ReservationError::TrainNotFound(9)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(ReservationError::InsufficientSeats { requested: 3, available: 1 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(ReservationError::Validation("seats".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ReservationError::Transaction(StoreError::Unavailable("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let response =
            AppError::from(StoreError::Unavailable("password=secret".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal Server Error");
    }
}
