pub mod models;
pub mod pii;

pub use models::{Booking, BookingStatus, Train, User, UserCredentials};
pub use pii::Masked;
