#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use showtime_booking::{HoldCommand, ReservationEngine};
use showtime_core::{
    ManualClock, Movie, ReservationStore, Screen, SeatDescriptor, SeatMapEntry, SeatType, SeatTypeMultipliers,
    Show, Theatre,
};
use showtime_store::{MemoryReservationStore, MemoryVenueCatalog};
use std::sync::Arc;
use uuid::Uuid;

/// One theatre, one 2x4 screen (row A premium, row B normal), one movie
/// priced at 150 and two shows of it.
pub struct Fixture {
    pub engine: ReservationEngine,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryReservationStore>,
    pub theatre_id: Uuid,
    pub screen_id: Uuid,
    pub movie_id: Uuid,
    pub show_id: Uuid,
    pub other_show_id: Uuid,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 1, 17, 0, 0).unwrap()
}

fn seat_map() -> Vec<SeatMapEntry> {
    let mut seats = Vec::new();
    for (row, seat_type) in [("A", SeatType::Premium), ("B", SeatType::Normal)] {
        for column in 1..=4u32 {
            seats.push(SeatMapEntry {
                seat_id: format!("{}{}", row, column),
                row: row.to_string(),
                column,
                seat_type,
            });
        }
    }
    seats
}

impl Fixture {
    pub fn new() -> Self {
        Self::wrapping_store(|store| store as Arc<dyn ReservationStore>)
    }

    /// Engine whose store is `wrap` applied to the in-memory store; `store`
    /// still points at the inner one.
    pub fn wrapping_store(
        wrap: impl FnOnce(Arc<MemoryReservationStore>) -> Arc<dyn ReservationStore>,
    ) -> Self {
        let theatre_id = Uuid::new_v4();
        let screen_id = Uuid::new_v4();
        let movie_id = Uuid::new_v4();
        let show_id = Uuid::new_v4();
        let other_show_id = Uuid::new_v4();

        let show = |id: Uuid| Show {
            id,
            theatre_id,
            screen_id,
            movie_id,
            start_time: Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 11, 1, 20, 0, 0).unwrap(),
            seat_type_multipliers: SeatTypeMultipliers::default(),
        };

        let catalog = MemoryVenueCatalog::new()
            .with_theatre(Theatre {
                id: theatre_id,
                name: "Grand Regal".to_string(),
                address: None,
            })
            .with_screen(Screen {
                id: screen_id,
                theatre_id,
                name: "Screen 1".to_string(),
                rows: 2,
                columns: 4,
                seat_map: seat_map(),
            })
            .with_movie(Movie {
                id: movie_id,
                title: "The Long Night".to_string(),
                languages: vec!["English".to_string()],
                genres: vec![],
                run_time_mins: Some(120),
                rating: None,
                base_seat_price: 150.0,
            })
            .with_show(show(show_id))
            .with_show(show(other_show_id));

        let clock = Arc::new(ManualClock::new(start_time()));
        let store = Arc::new(MemoryReservationStore::new());
        let engine = ReservationEngine::new(Arc::new(catalog), wrap(store.clone()), clock.clone());

        Self {
            engine,
            clock,
            store,
            theatre_id,
            screen_id,
            movie_id,
            show_id,
            other_show_id,
        }
    }

    pub fn hold_command(&self, show_id: Uuid, seats: &[(&str, SeatType)]) -> HoldCommand {
        HoldCommand {
            theatre_id: Some(self.theatre_id),
            screen_id: Some(self.screen_id),
            show_id: Some(show_id),
            movie_id: Some(self.movie_id),
            seats: seats
                .iter()
                .map(|(id, seat_type)| SeatDescriptor::new(*id, *seat_type))
                .collect(),
            user_id: None,
        }
    }
}
