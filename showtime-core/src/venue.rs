//! Venue records supplied by the catalog. The booking core only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::seat::SeatType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Theatre {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

/// One seat of a screen's fixed layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapEntry {
    pub seat_id: String,
    pub row: String,
    pub column: u32,
    #[serde(rename = "type")]
    pub seat_type: SeatType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: Uuid,
    pub theatre_id: Uuid,
    pub name: String,
    pub rows: u32,
    pub columns: u32,
    pub seat_map: Vec<SeatMapEntry>,
}

impl Screen {
    /// Recorded type of `seat_id`, if the seat exists on this screen.
    pub fn seat_type_of(&self, seat_id: &str) -> Option<SeatType> {
        self.seat_map
            .iter()
            .find(|s| s.seat_id == seat_id)
            .map(|s| s.seat_type)
    }
}

/// Per-show price scaling factors keyed by seat type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SeatTypeMultipliers(pub HashMap<SeatType, f64>);

impl SeatTypeMultipliers {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Factor for `seat_type`; a type missing from the table prices at 1.0.
    pub fn multiplier(&self, seat_type: SeatType) -> f64 {
        self.0.get(&seat_type).copied().unwrap_or(1.0)
    }

    pub fn with(mut self, seat_type: SeatType, factor: f64) -> Self {
        self.0.insert(seat_type, factor);
        self
    }
}

impl Default for SeatTypeMultipliers {
    fn default() -> Self {
        Self::empty()
            .with(SeatType::Normal, 1.0)
            .with(SeatType::Premium, 1.25)
            .with(SeatType::Luxury, 1.5)
            .with(SeatType::Recliner, 2.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: Uuid,
    pub theatre_id: Uuid,
    pub screen_id: Uuid,
    pub movie_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub seat_type_multipliers: SeatTypeMultipliers,
}

fn default_base_seat_price() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub run_time_mins: Option<u32>,
    pub rating: Option<f64>,
    #[serde(default = "default_base_seat_price")]
    pub base_seat_price: f64,
}
