use async_trait::async_trait;
use chrono::{DateTime, Utc};
use railbook_core::repository::TrainRepository;
use railbook_core::StoreError;
use railbook_shared::Train;
use sqlx::PgPool;

use crate::database::store_error;

pub(crate) const TRAIN_COLUMNS: &str =
    "id, name, from_station, to_station, departure_time, available_seats, price";

pub struct PostgresTrainRepository {
    pool: PgPool,
}

impl PostgresTrainRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TrainRow {
    id: i64,
    name: String,
    from_station: String,
    to_station: String,
    departure_time: DateTime<Utc>,
    available_seats: i32,
    price: i32,
}

impl From<TrainRow> for Train {
    fn from(row: TrainRow) -> Self {
        Train {
            id: row.id,
            name: row.name,
            from_station: row.from_station,
            to_station: row.to_station,
            departure_time: row.departure_time,
            available_seats: row.available_seats,
            price: row.price,
        }
    }
}

#[async_trait]
impl TrainRepository for PostgresTrainRepository {
    async fn list_trains(&self) -> Result<Vec<Train>, StoreError> {
        let rows = sqlx::query_as::<_, TrainRow>(&format!(
            "SELECT {} FROM trains ORDER BY departure_time, id",
            TRAIN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Train::from).collect())
    }

    async fn get_train(&self, id: i64) -> Result<Option<Train>, StoreError> {
        let row = sqlx::query_as::<_, TrainRow>(&format!(
            "SELECT {} FROM trains WHERE id = $1",
            TRAIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Train::from))
    }
}
