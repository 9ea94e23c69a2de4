use showtime_catalog::SeatValidationError;
use showtime_core::{CatalogError, StoreError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure kinds of the reservation operations. Each kind implies a
/// different client reaction, so they are never folded together.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Expired(String),
    #[error("internal error: {0}")]
    Internal(#[source] BoxError),
}

impl BookingError {
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::InvalidRequest(_) => "INVALID_REQUEST",
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::Conflict(_) => "CONFLICT",
            BookingError::InvalidState(_) => "INVALID_STATE",
            BookingError::Expired(_) => "EXPIRED",
            BookingError::Internal(_) => "INTERNAL",
        }
    }

    pub(crate) fn booking_not_found() -> Self {
        BookingError::NotFound("Booking not found".to_string())
    }
}

impl From<CatalogError> for BookingError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { entity, .. } => BookingError::NotFound(format!("{} not found", entity)),
            CatalogError::Backend(source) => BookingError::Internal(source),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            // the storage guard firing means another claim won the race
            StoreError::SeatTaken { .. } => {
                BookingError::Conflict("One or more seats already held or booked".to_string())
            }
            StoreError::StaleState(id) => {
                BookingError::InvalidState(format!("Booking {} is no longer in HELD state", id))
            }
            StoreError::NotFound(_) => BookingError::booking_not_found(),
            StoreError::Backend(source) => BookingError::Internal(source),
        }
    }
}

impl From<SeatValidationError> for BookingError {
    fn from(err: SeatValidationError) -> Self {
        BookingError::InvalidRequest(err.to_string())
    }
}
