use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat category as recorded in a screen's seat map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatType {
    Normal,
    Premium,
    Luxury,
    Recliner,
}

impl SeatType {
    pub const ALL: [SeatType; 4] = [
        SeatType::Normal,
        SeatType::Premium,
        SeatType::Luxury,
        SeatType::Recliner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Normal => "NORMAL",
            SeatType::Premium => "PREMIUM",
            SeatType::Luxury => "LUXURY",
            SeatType::Recliner => "RECLINER",
        }
    }
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seat as requested by a client: id plus the type the client believes it has.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatDescriptor {
    pub seat_id: String,
    pub seat_type: SeatType,
}

impl SeatDescriptor {
    pub fn new(seat_id: impl Into<String>, seat_type: SeatType) -> Self {
        Self {
            seat_id: seat_id.into(),
            seat_type,
        }
    }
}

/// A seat with its price locked at hold time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PricedSeat {
    pub seat_id: String,
    pub seat_type: SeatType,
    pub price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_type_wire_format() {
        let json = serde_json::to_string(&SeatType::Recliner).unwrap();
        assert_eq!(json, "\"RECLINER\"");

        let parsed: SeatDescriptor =
            serde_json::from_str(r#"{"seatId":"A1","seatType":"PREMIUM"}"#).unwrap();
        assert_eq!(parsed, SeatDescriptor::new("A1", SeatType::Premium));
    }

    #[test]
    fn test_unknown_seat_type_rejected() {
        let parsed = serde_json::from_str::<SeatDescriptor>(r#"{"seatId":"A1","seatType":"BALCONY"}"#);
        assert!(parsed.is_err());
    }
}
