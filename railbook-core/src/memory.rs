//! In-process implementation of every repository trait, used by tests and local
//! demos. One `tokio::sync::Mutex` guards all state, so reservations are serialized
//! the same way the row lock serializes them in PostgreSQL.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use railbook_shared::{Booking, Masked, Train, User, UserCredentials};
use tokio::sync::Mutex;

use crate::repository::{BookingRepository, HealthCheck, NewUser, TrainRepository, UserRepository};
use crate::reservation::{self, ReservationRequest};
use crate::{pnr, ReservationError, StoreError};

#[derive(Default)]
struct Inner {
    offline: bool,
    users: Vec<(User, String)>,
    trains: BTreeMap<i64, Train>,
    bookings: Vec<Booking>,
    next_user_id: i64,
    next_train_id: i64,
    next_booking_id: i64,
}

impl Inner {
    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_train(
        &self,
        name: &str,
        from_station: &str,
        to_station: &str,
        departure_time: DateTime<Utc>,
        available_seats: i32,
        price: i32,
    ) -> Train {
        let mut inner = self.inner.lock().await;
        inner.next_train_id += 1;
        let train = Train {
            id: inner.next_train_id,
            name: name.to_owned(),
            from_station: from_station.to_owned(),
            to_station: to_station.to_owned(),
            departure_time,
            available_seats,
            price,
        };
        inner.trains.insert(train.id, train.clone());
        train
    }

    /// Simulates losing the database: every call fails with `StoreError::Unavailable`.
    pub async fn set_offline(&self, offline: bool) {
        self.inner.lock().await.offline = offline;
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.ensure_online()?;
        if inner.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }
        inner.next_user_id += 1;
        let created = User {
            id: inner.next_user_id,
            name: user.name.clone(),
            email: user.email.clone(),
        };
        inner.users.push((created.clone(), user.password_hash.clone()));
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, StoreError> {
        let inner = self.inner.lock().await;
        inner.ensure_online()?;
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: Masked::new(hash.clone()),
            }))
    }
}

#[async_trait]
impl TrainRepository for InMemoryStore {
    async fn list_trains(&self) -> Result<Vec<Train>, StoreError> {
        let inner = self.inner.lock().await;
        inner.ensure_online()?;
        Ok(inner.trains.values().cloned().collect())
    }

    async fn get_train(&self, id: i64) -> Result<Option<Train>, StoreError> {
        let inner = self.inner.lock().await;
        inner.ensure_online()?;
        Ok(inner.trains.get(&id).cloned())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn reserve(
        &self,
        user_id: i64,
        request: &ReservationRequest,
    ) -> Result<Booking, ReservationError> {
        request.validate()?;

        let mut inner = self.inner.lock().await;
        inner.ensure_online()?;

        let train = inner
            .trains
            .get(&request.train_id)
            .ok_or(ReservationError::TrainNotFound(request.train_id))?;
        let draft = reservation::plan(train, user_id, request)?;

        let code = (0..pnr::MAX_PNR_ATTEMPTS)
            .map(|_| pnr::generate())
            .find(|code| !inner.bookings.iter().any(|b| &b.pnr == code))
            .ok_or_else(|| StoreError::Duplicate("bookings_pnr_key".to_string()))?;

        inner.next_booking_id += 1;
        let booking = Booking {
            id: inner.next_booking_id,
            user_id: draft.user_id,
            train_id: draft.train_id,
            train_name: draft.train_name,
            from_station: draft.from_station,
            to_station: draft.to_station,
            seats: draft.seats,
            passenger_name: draft.passenger_name,
            booking_date: Utc::now(),
            status: draft.status,
            pnr: code,
        };

        if let Some(train) = inner.trains.get_mut(&request.train_id) {
            train.available_seats -= booking.seats;
        }
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.lock().await;
        inner.ensure_online()?;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (b.booking_date, b.id).cmp(&(a.booking_date, a.id)));
        Ok(bookings)
    }

    async fn find_by_pnr(&self, user_id: i64, pnr: &str) -> Result<Option<Booking>, StoreError> {
        let inner = self.inner.lock().await;
        inner.ensure_online()?;
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.user_id == user_id && b.pnr == pnr)
            .cloned())
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.lock().await.ensure_online()
    }
}
