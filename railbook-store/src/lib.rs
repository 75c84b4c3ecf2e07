pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod train_repo;
pub mod user_repo;

pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use train_repo::PostgresTrainRepository;
pub use user_repo::PostgresUserRepository;
