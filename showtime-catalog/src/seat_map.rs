//! Checks a requested seat selection against a screen's seat map.

use showtime_core::{Screen, SeatDescriptor, SeatType};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatValidationError {
    #[error("no seats requested")]
    EmptySelection,
    #[error("Seat {0} not found in screen")]
    UnknownSeat(String),
    #[error("Seat {seat_id} type mismatch: requested {requested}, screen has {recorded}")]
    TypeMismatch {
        seat_id: String,
        requested: SeatType,
        recorded: SeatType,
    },
    #[error("Seat {0} requested more than once")]
    DuplicateSeat(String),
}

/// Every seat must exist on the screen with the recorded type, and appear
/// once. The whole selection is checked before anything is reserved.
pub fn validate_selection(screen: &Screen, seats: &[SeatDescriptor]) -> Result<(), SeatValidationError> {
    if seats.is_empty() {
        return Err(SeatValidationError::EmptySelection);
    }

    let layout: HashMap<&str, SeatType> = screen
        .seat_map
        .iter()
        .map(|entry| (entry.seat_id.as_str(), entry.seat_type))
        .collect();
    let mut seen = HashSet::with_capacity(seats.len());

    for seat in seats {
        let recorded = layout
            .get(seat.seat_id.as_str())
            .copied()
            .ok_or_else(|| SeatValidationError::UnknownSeat(seat.seat_id.clone()))?;

        if recorded != seat.seat_type {
            return Err(SeatValidationError::TypeMismatch {
                seat_id: seat.seat_id.clone(),
                requested: seat.seat_type,
                recorded,
            });
        }

        if !seen.insert(seat.seat_id.as_str()) {
            return Err(SeatValidationError::DuplicateSeat(seat.seat_id.clone()));
        }
    }

    Ok(())
}
