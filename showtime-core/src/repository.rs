use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::reservation::Reservation;
use crate::venue::{Movie, Screen, Show, Theatre};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("catalog backend failure: {0}")]
    Backend(#[source] BoxError),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CatalogError::NotFound { entity, id }
    }

    pub fn backend<E: Into<BoxError>>(err: E) -> Self {
        CatalogError::Backend(err.into())
    }
}

/// Read-only access to theatres, screens, shows and movies.
#[async_trait]
pub trait VenueCatalog: Send + Sync {
    async fn get_theatre(&self, theatre_id: Uuid) -> Result<Theatre, CatalogError>;

    /// Fails with `NotFound` when either id is unknown or the screen is not
    /// part of the theatre.
    async fn get_screen(&self, theatre_id: Uuid, screen_id: Uuid) -> Result<Screen, CatalogError>;

    async fn get_show(&self, show_id: Uuid) -> Result<Show, CatalogError>;

    async fn get_movie(&self, movie_id: Uuid) -> Result<Movie, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage-level seat uniqueness guard refused the write.
    #[error("seat {seat_id} is already claimed for show {show_id}")]
    SeatTaken { show_id: Uuid, seat_id: String },
    /// A conditional status transition found the row in another state.
    #[error("reservation {0} changed state concurrently")]
    StaleState(Uuid),
    #[error("reservation not found: {0}")]
    NotFound(Uuid),
    #[error("store backend failure: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend<E: Into<BoxError>>(err: E) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Which existing reservations count as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictScope {
    /// CONFIRMED, or HELD with an expiry strictly after the instant.
    ActiveAt(DateTime<Utc>),
    ConfirmedOnly,
}

/// The hot query behind hold and confirm: reservations of one show that
/// share at least one seat id and match the scope.
#[derive(Debug, Clone)]
pub struct ConflictQuery {
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub scope: ConflictScope,
    pub exclude: Option<Uuid>,
}

impl ConflictQuery {
    pub fn matches(&self, candidate: &Reservation) -> bool {
        if candidate.show_id() != self.show_id || Some(candidate.id) == self.exclude {
            return false;
        }
        let in_scope = match self.scope {
            ConflictScope::ActiveAt(now) => candidate.is_active_at(now),
            ConflictScope::ConfirmedOnly => {
                candidate.status == crate::reservation::ReservationStatus::Confirmed
            }
        };
        in_scope && candidate.claims_any(&self.seat_ids)
    }
}

/// Durable record of every reservation plus the per-(show, seat) claim guard.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persist a HELD reservation and claim each of its seats in one atomic
    /// step. A seat already held by an active reservation yields
    /// `SeatTaken` and nothing is written.
    async fn insert_held(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, StoreError>;

    /// First reservation matching the query, if any.
    async fn find_conflict(&self, query: &ConflictQuery) -> Result<Option<Reservation>, StoreError>;

    /// HELD (unexpired at `now`) → CONFIRMED, promoting the seat claims.
    async fn confirm(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, StoreError>;

    /// HELD → CANCELLED, releasing the seat claims.
    async fn cancel(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, StoreError>;

    /// Rewrite lapsed HELD rows as EXPIRED and release their claims.
    /// Returns the number of reservations touched.
    async fn expire_stale_holds(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::{ReservationStatus, SchedulingContext};
    use crate::seat::{PricedSeat, SeatType};
    use chrono::Duration;

    fn reservation(show_id: Uuid, seat: &str, now: DateTime<Utc>) -> Reservation {
        let context = SchedulingContext {
            theatre_id: Uuid::new_v4(),
            screen_id: Uuid::new_v4(),
            show_id,
            movie_id: Uuid::new_v4(),
        };
        let seats = vec![PricedSeat { seat_id: seat.into(), seat_type: SeatType::Normal, price: 100 }];
        Reservation::new_held(context, None, seats, now, now + Duration::minutes(5))
    }

    #[test]
    fn test_active_scope_ignores_lapsed_holds() {
        let now = Utc::now();
        let show_id = Uuid::new_v4();
        let existing = reservation(show_id, "C3", now);

        let query = ConflictQuery {
            show_id,
            seat_ids: vec!["C3".into()],
            scope: ConflictScope::ActiveAt(now + Duration::minutes(1)),
            exclude: None,
        };
        assert!(query.matches(&existing));

        let later = ConflictQuery { scope: ConflictScope::ActiveAt(now + Duration::minutes(5)), ..query };
        assert!(!later.matches(&existing));
    }

    #[test]
    fn test_confirmed_scope_and_exclusion() {
        let now = Utc::now();
        let show_id = Uuid::new_v4();
        let mut existing = reservation(show_id, "C3", now);

        let query = ConflictQuery {
            show_id,
            seat_ids: vec!["C3".into()],
            scope: ConflictScope::ConfirmedOnly,
            exclude: None,
        };
        assert!(!query.matches(&existing));

        existing.status = ReservationStatus::Confirmed;
        assert!(query.matches(&existing));

        let excluded = ConflictQuery { exclude: Some(existing.id), ..query };
        assert!(!excluded.matches(&existing));
    }

    #[test]
    fn test_other_show_never_conflicts() {
        let now = Utc::now();
        let existing = reservation(Uuid::new_v4(), "C3", now);
        let query = ConflictQuery {
            show_id: Uuid::new_v4(),
            seat_ids: vec!["C3".into()],
            scope: ConflictScope::ActiveAt(now),
            exclude: None,
        };
        assert!(!query.matches(&existing));
    }
}
