//! In-process implementations of the catalog and the reservation store,
//! used by tests and by local runs without Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use showtime_core::{
    CatalogError, ConflictQuery, Movie, Reservation, ReservationStatus, ReservationStore, Screen, Show,
    StoreError, Theatre, VenueCatalog,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// Venue catalog
// ============================================================================

/// Catalog contents as loaded from a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub theatres: Vec<Theatre>,
    pub screens: Vec<Screen>,
    pub shows: Vec<Show>,
    pub movies: Vec<Movie>,
}

/// Immutable venue catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryVenueCatalog {
    theatres: HashMap<Uuid, Theatre>,
    screens: HashMap<Uuid, Screen>,
    shows: HashMap<Uuid, Show>,
    movies: HashMap<Uuid, Movie>,
}

impl MemoryVenueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: CatalogSeed) -> Self {
        let catalog = seed.theatres.into_iter().fold(Self::new(), Self::with_theatre);
        let catalog = seed.screens.into_iter().fold(catalog, Self::with_screen);
        let catalog = seed.shows.into_iter().fold(catalog, Self::with_show);
        seed.movies.into_iter().fold(catalog, Self::with_movie)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_seed(serde_json::from_str(json)?))
    }

    pub fn with_theatre(mut self, theatre: Theatre) -> Self {
        self.theatres.insert(theatre.id, theatre);
        self
    }

    pub fn with_screen(mut self, screen: Screen) -> Self {
        self.screens.insert(screen.id, screen);
        self
    }

    pub fn with_show(mut self, show: Show) -> Self {
        self.shows.insert(show.id, show);
        self
    }

    pub fn with_movie(mut self, movie: Movie) -> Self {
        self.movies.insert(movie.id, movie);
        self
    }
}

#[async_trait]
impl VenueCatalog for MemoryVenueCatalog {
    async fn get_theatre(&self, theatre_id: Uuid) -> Result<Theatre, CatalogError> {
        self.theatres
            .get(&theatre_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Theatre", theatre_id))
    }

    async fn get_screen(&self, theatre_id: Uuid, screen_id: Uuid) -> Result<Screen, CatalogError> {
        if !self.theatres.contains_key(&theatre_id) {
            return Err(CatalogError::not_found("Theatre", theatre_id));
        }
        self.screens
            .get(&screen_id)
            .filter(|screen| screen.theatre_id == theatre_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Screen", screen_id))
    }

    async fn get_show(&self, show_id: Uuid) -> Result<Show, CatalogError> {
        self.shows
            .get(&show_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Show", show_id))
    }

    async fn get_movie(&self, movie_id: Uuid) -> Result<Movie, CatalogError> {
        self.movies
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Movie", movie_id))
    }
}

// ============================================================================
// Reservation store
// ============================================================================

#[derive(Default)]
struct StoreState {
    reservations: HashMap<Uuid, Reservation>,
    /// (show, seat) → reservation currently claiming it
    claims: HashMap<(Uuid, String), Uuid>,
}

impl StoreState {
    fn claimant(&self, show_id: Uuid, seat_id: &str) -> Option<&Reservation> {
        self.claims
            .get(&(show_id, seat_id.to_string()))
            .and_then(|id| self.reservations.get(id))
    }

    fn release_claims(&mut self, reservation_id: Uuid) {
        self.claims.retain(|_, owner| *owner != reservation_id);
    }
}

/// Reservation store with the same guarantees as the Postgres one: the
/// seat check and the insert happen under one write lock.
#[derive(Default)]
pub struct MemoryReservationStore {
    state: RwLock<StoreState>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.reservations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn insert_held(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let show_id = reservation.show_id();

        for seat in &reservation.seats {
            if let Some(owner) = state.claimant(show_id, &seat.seat_id) {
                if owner.is_active_at(now) {
                    return Err(StoreError::SeatTaken {
                        show_id,
                        seat_id: seat.seat_id.clone(),
                    });
                }
            }
        }

        for seat in &reservation.seats {
            state.claims.insert((show_id, seat.seat_id.clone()), reservation.id);
        }
        state.reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        Ok(self.state.read().await.reservations.get(&id).cloned())
    }

    async fn find_conflict(&self, query: &ConflictQuery) -> Result<Option<Reservation>, StoreError> {
        let state = self.state.read().await;
        let found = query
            .seat_ids
            .iter()
            .filter_map(|seat_id| state.claimant(query.show_id, seat_id))
            .find(|candidate| query.matches(candidate))
            .cloned();
        Ok(found)
    }

    async fn confirm(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, StoreError> {
        let mut state = self.state.write().await;
        let current = state.reservations.get(&id).ok_or(StoreError::NotFound(id))?;
        if current.status != ReservationStatus::Held || current.is_hold_expired(now) {
            return Err(StoreError::StaleState(id));
        }

        let show_id = current.show_id();
        if let Some(lost) = current
            .seats
            .iter()
            .find(|s| state.claims.get(&(show_id, s.seat_id.clone())) != Some(&id))
        {
            return Err(StoreError::SeatTaken {
                show_id,
                seat_id: lost.seat_id.clone(),
            });
        }

        let reservation = state.reservations.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        reservation.status = ReservationStatus::Confirmed;
        reservation.updated_at = now;
        Ok(reservation.clone())
    }

    async fn cancel(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, StoreError> {
        let mut state = self.state.write().await;
        let reservation = state.reservations.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if reservation.status != ReservationStatus::Held {
            return Err(StoreError::StaleState(id));
        }

        reservation.status = ReservationStatus::Cancelled;
        reservation.updated_at = now;
        let cancelled = reservation.clone();
        state.release_claims(id);
        Ok(cancelled)
    }

    async fn expire_stale_holds(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let mut expired = Vec::new();

        for reservation in state.reservations.values_mut() {
            if reservation.status == ReservationStatus::Held && reservation.is_hold_expired(now) {
                reservation.status = ReservationStatus::Expired;
                reservation.updated_at = now;
                expired.push(reservation.id);
            }
        }
        for id in &expired {
            state.release_claims(*id);
        }

        Ok(expired.len() as u64)
    }
}
