use async_trait::async_trait;
use railbook_core::repository::HealthCheck;
use railbook_core::StoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{info, warn};

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    /// Builds the pool without touching the network; connections open on first use.
    /// Only a malformed URL fails here.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_lazy(config.url.expose())?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Retries `migrate` until it succeeds, doubling the pause after each failure
    /// up to `max_delay`. Used when the database was not reachable at startup.
    pub async fn migrate_with_retry(&self, initial_delay: Duration, max_delay: Duration) {
        let mut delay = initial_delay;
        let mut attempt: u32 = 1;
        loop {
            match self.migrate().await {
                Ok(()) => return,
                Err(e) => {
                    warn!(
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "Database migrations failed: {}",
                        e
                    );
                }
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(max_delay);
            attempt += 1;
        }
    }
}

#[async_trait]
impl HealthCheck for DbClient {
    async fn ping(&self) -> Result<(), StoreError> {
        let conn = self.pool.acquire().await.map_err(store_error)?;
        drop(conn);
        Ok(())
    }
}

/// Classifies a driver error into the store taxonomy.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::Duplicate(db.constraint().unwrap_or("unique").to_owned());
        }
    }

    let unavailable = matches!(
        err,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
    );
    if unavailable {
        return StoreError::Unavailable(err.to_string());
    }

    StoreError::backend(err)
}
