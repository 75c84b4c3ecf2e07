use railbook_shared::{BookingStatus, Train};
use serde::{Deserialize, Serialize};

use crate::{ReservationError, ReservationResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub train_id: i64,
    pub seats: i32,
    pub passenger_name: String,
}

impl ReservationRequest {
    /// Input checks that need no store access. Runs before any lock is taken.
    pub fn validate(&self) -> ReservationResult<()> {
        if self.seats < 1 {
            return Err(ReservationError::Validation(
                "seats must be at least 1".to_string(),
            ));
        }
        if self.passenger_name.trim().is_empty() {
            return Err(ReservationError::Validation(
                "passengerName is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Booking row about to be inserted, snapshotting the locked train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub user_id: i64,
    pub train_id: i64,
    pub train_name: String,
    pub from_station: String,
    pub to_station: String,
    pub seats: i32,
    pub passenger_name: String,
    pub status: BookingStatus,
}

/// Decides a reservation against the current (locked) state of `train`.
///
/// Callers must hold the train's row lock from before this call until the booking
/// insert and seat decrement have committed.
pub fn plan(
    train: &Train,
    user_id: i64,
    request: &ReservationRequest,
) -> ReservationResult<BookingDraft> {
    if request.seats > train.available_seats {
        return Err(ReservationError::InsufficientSeats {
            requested: request.seats,
            available: train.available_seats,
        });
    }

    Ok(BookingDraft {
        user_id,
        train_id: train.id,
        train_name: train.name.clone(),
        from_station: train.from_station.clone(),
        to_station: train.to_station.clone(),
        seats: request.seats,
        passenger_name: request.passenger_name.trim().to_string(),
        status: BookingStatus::Confirmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn train(available_seats: i32) -> Train {
        Train {
            id: 11,
            name: "Shatabdi Express".to_string(),
            from_station: "Chennai".to_string(),
            to_station: "Bengaluru".to_string(),
            departure_time: Utc::now(),
            available_seats,
            price: 950,
        }
    }

    fn request(seats: i32) -> ReservationRequest {
        ReservationRequest {
            train_id: 11,
            seats,
            passenger_name: "  Ravi Kumar ".to_string(),
        }
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: ReservationRequest =
            serde_json::from_str(r#"{"trainId":4,"seats":2,"passengerName":"Meera"}"#).unwrap();
        assert_eq!(req.train_id, 4);
        assert_eq!(req.seats, 2);
        assert_eq!(req.passenger_name, "Meera");
    }

    #[test]
    fn test_validate_rejects_non_positive_seats() {
        assert!(matches!(request(0).validate(), Err(ReservationError::Validation(_))));
        assert!(matches!(request(-3).validate(), Err(ReservationError::Validation(_))));
        assert!(request(1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_passenger() {
        let mut req = request(1);
        req.passenger_name = "   ".to_string();
        assert!(matches!(req.validate(), Err(ReservationError::Validation(_))));
    }

    #[test]
    fn test_plan_snapshots_train() {
        let draft = plan(&train(5), 3, &request(2)).unwrap();
        assert_eq!(draft.user_id, 3);
        assert_eq!(draft.train_id, 11);
        assert_eq!(draft.train_name, "Shatabdi Express");
        assert_eq!(draft.from_station, "Chennai");
        assert_eq!(draft.to_station, "Bengaluru");
        assert_eq!(draft.passenger_name, "Ravi Kumar");
        assert_eq!(draft.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_plan_allows_taking_the_last_seats() {
        assert!(plan(&train(2), 1, &request(2)).is_ok());
    }

    #[test]
    fn test_plan_rejects_overbooking() {
        match plan(&train(1), 1, &request(2)) {
            Err(ReservationError::InsufficientSeats { requested, available }) => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientSeats, got {:?}", other),
        }
    }
}
