use async_trait::async_trait;
use railbook_shared::{Booking, Train, User, UserCredentials};

use crate::reservation::ReservationRequest;
use crate::{ReservationError, StoreError};

/// Fields needed to persist a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the email is already registered.
    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, StoreError>;
}

/// Read side of the inventory store.
#[async_trait]
pub trait TrainRepository: Send + Sync {
    async fn list_trains(&self) -> Result<Vec<Train>, StoreError>;

    async fn get_train(&self, id: i64) -> Result<Option<Train>, StoreError>;
}

/// Booking ledger plus the reservation transaction, the only writer of
/// `Train::available_seats`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomically checks availability, records a confirmed booking and decrements
    /// the train's seat counter. On any error nothing is written.
    async fn reserve(
        &self,
        user_id: i64,
        request: &ReservationRequest,
    ) -> Result<Booking, ReservationError>;

    /// Bookings owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, StoreError>;

    async fn find_by_pnr(&self, user_id: i64, pnr: &str) -> Result<Option<Booking>, StoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}
