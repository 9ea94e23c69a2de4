use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::seat::PricedSeat;

/// Reservation status in the hold lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Held,
    Confirmed,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Held => "HELD",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HELD" => Ok(ReservationStatus::Held),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "EXPIRED" => Ok(ReservationStatus::Expired),
            other => Err(format!("unknown reservation status: {}", other)),
        }
    }
}

/// Theatre, screen, show and movie a reservation belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingContext {
    pub theatre_id: Uuid,
    pub screen_id: Uuid,
    pub show_id: Uuid,
    pub movie_id: Uuid,
}

/// A claim on a set of seats for one show.
///
/// Seats, prices and the scheduling context never change after creation;
/// only `status` and `updated_at` move.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    #[serde(flatten)]
    pub context: SchedulingContext,
    pub user_id: Option<Uuid>,
    pub seats: Vec<PricedSeat>,
    pub status: ReservationStatus,
    pub hold_expires_at: DateTime<Utc>,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Build a fresh HELD reservation. The total is derived from the seats.
    pub fn new_held(
        context: SchedulingContext,
        user_id: Option<Uuid>,
        seats: Vec<PricedSeat>,
        now: DateTime<Utc>,
        hold_expires_at: DateTime<Utc>,
    ) -> Self {
        let total_amount = seats.iter().map(|s| s.price).sum();
        Self {
            id: Uuid::new_v4(),
            context,
            user_id,
            seats,
            status: ReservationStatus::Held,
            hold_expires_at,
            total_amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn show_id(&self) -> Uuid {
        self.context.show_id
    }

    pub fn seat_ids(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.seat_id.clone()).collect()
    }

    pub fn is_hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.hold_expires_at <= now
    }

    /// Whether this reservation blocks other claims on its seats at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            ReservationStatus::Confirmed => true,
            ReservationStatus::Held => !self.is_hold_expired(now),
            ReservationStatus::Cancelled | ReservationStatus::Expired => false,
        }
    }

    /// Status as a reader should see it: a lapsed hold reads as EXPIRED
    /// even when no sweep has rewritten the stored row.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ReservationStatus {
        match self.status {
            ReservationStatus::Held if self.is_hold_expired(now) => ReservationStatus::Expired,
            status => status,
        }
    }

    pub fn claims_any<S: AsRef<str>>(&self, seat_ids: &[S]) -> bool {
        self.seats
            .iter()
            .any(|s| seat_ids.iter().any(|id| id.as_ref() == s.seat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::SeatType;
    use chrono::Duration;

    fn held(now: DateTime<Utc>) -> Reservation {
        let context = SchedulingContext {
            theatre_id: Uuid::new_v4(),
            screen_id: Uuid::new_v4(),
            show_id: Uuid::new_v4(),
            movie_id: Uuid::new_v4(),
        };
        let seats = vec![
            PricedSeat { seat_id: "A1".into(), seat_type: SeatType::Premium, price: 188 },
            PricedSeat { seat_id: "A2".into(), seat_type: SeatType::Normal, price: 150 },
        ];
        Reservation::new_held(context, None, seats, now, now + Duration::minutes(5))
    }

    #[test]
    fn test_total_is_sum_of_seat_prices() {
        let r = held(Utc::now());
        assert_eq!(r.total_amount, 338);
        assert_eq!(r.status, ReservationStatus::Held);
    }

    #[test]
    fn test_hold_activity_window() {
        let now = Utc::now();
        let r = held(now);
        assert!(r.is_active_at(now));
        assert!(r.is_active_at(now + Duration::minutes(4)));
        // expiry instant itself is no longer active
        assert!(!r.is_active_at(now + Duration::minutes(5)));
        assert_eq!(r.effective_status(now + Duration::minutes(6)), ReservationStatus::Expired);
    }

    #[test]
    fn test_confirmed_blocks_forever() {
        let now = Utc::now();
        let mut r = held(now);
        r.status = ReservationStatus::Confirmed;
        assert!(r.is_active_at(now + Duration::days(30)));
        assert_eq!(r.effective_status(now + Duration::days(30)), ReservationStatus::Confirmed);
    }

    #[test]
    fn test_claims_any() {
        let r = held(Utc::now());
        assert!(r.claims_any(&["B7", "A2"]));
        assert!(!r.claims_any(&["B7"]));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            ReservationStatus::Held,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
        assert!("PENDING".parse::<ReservationStatus>().is_err());
    }
}
