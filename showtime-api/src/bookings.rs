use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use showtime_booking::{BookingView, CancelCommand, ConfirmCommand, HoldCommand};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldResponse {
    pub message: String,
    pub booking_id: Uuid,
    pub hold_expires_at: DateTime<Utc>,
    pub total_amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingActionResponse {
    pub message: String,
    pub booking_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BookingEnvelope {
    pub booking: BookingView,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/book", post(hold_seats))
        .route("/pay", post(confirm_booking))
        .route("/cancel", post(cancel_booking))
        .route("/getbooking/{id}", get(get_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/booking/book
/// Hold seats for five minutes
async fn hold_seats(
    State(state): State<AppState>,
    payload: Result<Json<HoldCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<HoldResponse>), AppError> {
    let Json(cmd) = payload?;
    let receipt = state.engine.hold(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(HoldResponse {
            message: "Seats held for 5 minutes".to_string(),
            booking_id: receipt.booking_id,
            hold_expires_at: receipt.hold_expires_at,
            total_amount: receipt.total_amount,
        }),
    ))
}

/// POST /api/booking/pay
/// Confirm a held booking after payment succeeded
async fn confirm_booking(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmCommand>, JsonRejection>,
) -> Result<Json<BookingActionResponse>, AppError> {
    let Json(cmd) = payload?;
    let outcome = state.engine.confirm(cmd).await?;

    let message = if outcome.already_confirmed {
        "Already confirmed"
    } else {
        "Booking confirmed"
    };
    Ok(Json(BookingActionResponse {
        message: message.to_string(),
        booking_id: outcome.booking_id,
    }))
}

/// POST /api/booking/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    payload: Result<Json<CancelCommand>, JsonRejection>,
) -> Result<Json<BookingActionResponse>, AppError> {
    let Json(cmd) = payload?;
    let booking_id = state.engine.cancel(cmd).await?;

    Ok(Json(BookingActionResponse {
        message: "Booking cancelled".to_string(),
        booking_id,
    }))
}

/// GET /api/booking/getbooking/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingEnvelope>, AppError> {
    // an id that cannot be parsed cannot name a booking
    let booking_id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Booking not found".to_string()))?;
    let booking = state.engine.fetch(booking_id).await?;

    Ok(Json(BookingEnvelope { booking }))
}
