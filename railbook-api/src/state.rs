use std::sync::Arc;

use railbook_core::memory::InMemoryStore;
use railbook_core::repository::{BookingRepository, HealthCheck, TrainRepository};
use railbook_core::{AuthService, TokenKeys};
use railbook_store::app_config::{AuthConfig, CorsConfig};
use railbook_store::{
    DbClient, PostgresBookingRepository, PostgresTrainRepository, PostgresUserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub trains: Arc<dyn TrainRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub health: Arc<dyn HealthCheck>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn postgres(db: &DbClient, auth: &AuthConfig, cors: &CorsConfig) -> Self {
        let keys = TokenKeys::new(auth.jwt_secret.expose(), auth.jwt_expiration_seconds);
        let users = Arc::new(PostgresUserRepository::new(db.pool.clone()));

        Self {
            auth: Arc::new(AuthService::new(users, keys, auth.bcrypt_cost)),
            trains: Arc::new(PostgresTrainRepository::new(db.pool.clone())),
            bookings: Arc::new(PostgresBookingRepository::new(db.pool.clone())),
            health: Arc::new(db.clone()),
            allowed_origins: Arc::new(cors.allowed_origins.clone()),
        }
    }

    /// Wires every repository to one in-process store. Used by tests and demos.
    pub fn in_memory(store: InMemoryStore, keys: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            auth: Arc::new(AuthService::new(Arc::new(store.clone()), keys, bcrypt_cost)),
            trains: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            health: Arc::new(store),
            allowed_origins: Arc::new(Vec::new()),
        }
    }
}
