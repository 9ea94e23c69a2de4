use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showtime_core::{
    Movie, PricedSeat, Reservation, ReservationStatus, SchedulingContext, SeatDescriptor, Show, Theatre,
};
use uuid::Uuid;

use crate::error::BookingError;

// ============================================================================
// Commands
// ============================================================================

/// Request to hold seats. Every field is optional on the wire so that a
/// missing id surfaces as `InvalidRequest` rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldCommand {
    pub theatre_id: Option<Uuid>,
    pub screen_id: Option<Uuid>,
    pub show_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    #[serde(default)]
    pub seats: Vec<SeatDescriptor>,
    pub user_id: Option<Uuid>,
}

impl HoldCommand {
    pub(crate) fn context(&self) -> Result<SchedulingContext, BookingError> {
        match (self.theatre_id, self.screen_id, self.show_id, self.movie_id) {
            (Some(theatre_id), Some(screen_id), Some(show_id), Some(movie_id)) if !self.seats.is_empty() => {
                Ok(SchedulingContext {
                    theatre_id,
                    screen_id,
                    show_id,
                    movie_id,
                })
            }
            _ => Err(BookingError::InvalidRequest("Missing required fields".to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCommand {
    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelCommand {
    pub booking_id: Option<Uuid>,
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldReceipt {
    pub booking_id: Uuid,
    pub hold_expires_at: DateTime<Utc>,
    pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOutcome {
    pub booking_id: Uuid,
    /// True when the booking was already CONFIRMED before this call.
    pub already_confirmed: bool,
}

/// A reservation joined with the venue records it points at. Records that
/// have since vanished from the catalog read as `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub status: ReservationStatus,
    pub theatre: Option<Theatre>,
    pub screen_id: Uuid,
    pub show: Option<Show>,
    pub movie: Option<Movie>,
    pub seats: Vec<PricedSeat>,
    pub total_amount: i64,
    pub hold_expires_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingView {
    pub(crate) fn assemble(
        reservation: Reservation,
        now: DateTime<Utc>,
        theatre: Option<Theatre>,
        show: Option<Show>,
        movie: Option<Movie>,
    ) -> Self {
        Self {
            id: reservation.id,
            status: reservation.effective_status(now),
            theatre,
            screen_id: reservation.context.screen_id,
            show,
            movie,
            total_amount: reservation.total_amount,
            hold_expires_at: reservation.hold_expires_at,
            user_id: reservation.user_id,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
            seats: reservation.seats,
        }
    }
}
