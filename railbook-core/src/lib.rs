pub mod auth;
pub mod identity;
pub mod memory;
pub mod pnr;
pub mod repository;
pub mod reservation;

pub use auth::{AuthService, AuthSession};
pub use identity::{Claims, TokenKeys};
pub use reservation::ReservationRequest;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),
    #[error("Unique constraint violated: {0}")]
    Duplicate(String),
    #[error("Database error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        StoreError::Backend(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Train {0} not found")]
    TrainNotFound(i64),
    #[error("Not enough seats available: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },
    #[error("Reservation transaction failed: {0}")]
    Transaction(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("User already exists")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Credential processing failed: {0}")]
    Hashing(String),
    #[error("Token signing failed: {0}")]
    Token(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ReservationResult<T> = Result<T, ReservationError>;
pub type AuthResult<T> = Result<T, AuthError>;
