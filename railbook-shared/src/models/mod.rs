use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pii::Masked;

/// Public projection of a registered user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A user together with the stored bcrypt hash, as read by the credential store.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: Masked<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub id: i64,
    pub name: String,
    pub from_station: String,
    pub to_station: String,
    pub departure_time: DateTime<Utc>,
    /// Seats still open for reservation. Never negative.
    pub available_seats: i32,
    /// Fare per seat in whole currency units.
    pub price: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBookingStatus(pub String);

impl fmt::Display for UnknownBookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown booking status: {}", self.0)
    }
}

impl std::error::Error for UnknownBookingStatus {}

impl FromStr for BookingStatus {
    type Err = UnknownBookingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownBookingStatus(other.to_owned())),
        }
    }
}

/// A committed reservation. Train name and route are copied from the train at
/// booking time so later edits to the train leave history untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub train_id: i64,
    pub train_name: String,
    pub from_station: String,
    pub to_station: String,
    pub seats: i32,
    pub passenger_name: String,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub pnr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_round_trips_through_text() {
        for status in [BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("CONFIRMED".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_booking_serializes_snake_case_fields() {
        let booking = Booking {
            id: 7,
            user_id: 1,
            train_id: 3,
            train_name: "Rajdhani Express".to_string(),
            from_station: "Delhi".to_string(),
            to_station: "Mumbai".to_string(),
            seats: 2,
            passenger_name: "Asha".to_string(),
            booking_date: Utc::now(),
            status: BookingStatus::Confirmed,
            pnr: "AB12CD34".to_string(),
        };

        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["passenger_name"], "Asha");
        assert_eq!(json["status"], "Confirmed");
        assert_eq!(json["pnr"], "AB12CD34");
    }
}
