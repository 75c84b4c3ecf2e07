use async_trait::async_trait;
use chrono::{DateTime, Utc};
use railbook_core::repository::BookingRepository;
use railbook_core::reservation::{self, ReservationRequest};
use railbook_core::{pnr, ReservationError, StoreError};
use railbook_shared::{Booking, BookingStatus, Train};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::database::store_error;
use crate::train_repo::{TrainRow, TRAIN_COLUMNS};

const BOOKING_COLUMNS: &str = "id, user_id, train_id, train_name, from_station, to_station, \
     seats, passenger_name, booking_date, status, pnr";

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    user_id: i64,
    train_id: i64,
    train_name: String,
    from_station: String,
    to_station: String,
    seats: i32,
    passenger_name: String,
    booking_date: DateTime<Utc>,
    status: String,
    pnr: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BookingStatus>().map_err(StoreError::backend)?;
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            train_id: row.train_id,
            train_name: row.train_name,
            from_station: row.from_station,
            to_station: row.to_station,
            seats: row.seats,
            passenger_name: row.passenger_name,
            booking_date: row.booking_date,
            status,
            pnr: row.pnr,
        })
    }
}

/// Draws PNR codes until one is not yet used. The UNIQUE constraint on
/// `bookings.pnr` still backs this up against concurrent inserts.
async fn fresh_pnr(conn: &mut PgConnection) -> Result<String, StoreError> {
    for _ in 0..pnr::MAX_PNR_ATTEMPTS {
        let code = pnr::generate();
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bookings WHERE pnr = $1)")
                .bind(&code)
                .fetch_one(&mut *conn)
                .await
                .map_err(store_error)?;
        if !taken {
            return Ok(code);
        }
        warn!(pnr = %code, "PNR collision, drawing again");
    }
    Err(StoreError::Duplicate("bookings_pnr_key".to_string()))
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn reserve(
        &self,
        user_id: i64,
        request: &ReservationRequest,
    ) -> Result<Booking, ReservationError> {
        request.validate()?;

        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // Row lock held until commit or rollback; concurrent callers for the same
        // train queue here and then see the decremented counter.
        let locked = sqlx::query_as::<_, TrainRow>(&format!(
            "SELECT {} FROM trains WHERE id = $1 FOR UPDATE",
            TRAIN_COLUMNS
        ))
        .bind(request.train_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let Some(train) = locked.map(Train::from) else {
            tx.rollback().await.map_err(store_error)?;
            return Err(ReservationError::TrainNotFound(request.train_id));
        };

        let draft = match reservation::plan(&train, user_id, request) {
            Ok(draft) => draft,
            Err(e) => {
                tx.rollback().await.map_err(store_error)?;
                warn!(
                    train_id = train.id,
                    requested = request.seats,
                    available = train.available_seats,
                    "Reservation rejected"
                );
                return Err(e);
            }
        };

        let code = fresh_pnr(&mut tx).await?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (user_id, train_id, train_name, from_station, to_station,
                                  seats, passenger_name, booking_date, status, pnr)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8, $9)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(draft.user_id)
        .bind(draft.train_id)
        .bind(&draft.train_name)
        .bind(&draft.from_station)
        .bind(&draft.to_station)
        .bind(draft.seats)
        .bind(&draft.passenger_name)
        .bind(draft.status.as_str())
        .bind(&code)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;

        sqlx::query("UPDATE trains SET available_seats = available_seats - $1 WHERE id = $2")
            .bind(draft.seats)
            .bind(draft.train_id)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        let booking = Booking::try_from(row)?;

        // Dropping `tx` on any early return above rolls the transaction back.
        tx.commit().await.map_err(store_error)?;

        info!(
            booking_id = booking.id,
            pnr = %booking.pnr,
            train_id = booking.train_id,
            seats = booking.seats,
            "Reservation confirmed"
        );
        Ok(booking)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_by_pnr(&self, user_id: i64, pnr: &str) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 AND pnr = $2",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .bind(pnr)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> BookingRow {
        BookingRow {
            id: 1,
            user_id: 2,
            train_id: 3,
            train_name: "Garib Rath".to_string(),
            from_station: "Mumbai".to_string(),
            to_station: "Delhi".to_string(),
            seats: 1,
            passenger_name: "Neha".to_string(),
            booking_date: Utc::now(),
            status: status.to_string(),
            pnr: "Q7W8E9R0".to_string(),
        }
    }

    #[test]
    fn test_row_maps_to_booking() {
        let booking = Booking::try_from(row("Confirmed")).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.train_name, "Garib Rath");
    }

    #[test]
    fn test_unknown_status_is_a_store_error() {
        assert!(matches!(Booking::try_from(row("Lost")), Err(StoreError::Backend(_))));
    }
}
