use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatEventKind {
    Held,
    Confirmed,
    Released,
}

/// Availability change for a set of seats on one show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatEvent {
    pub show_id: Uuid,
    pub booking_id: Uuid,
    pub seat_ids: Vec<String>,
    pub kind: SeatEventKind,
    pub at: DateTime<Utc>,
}
