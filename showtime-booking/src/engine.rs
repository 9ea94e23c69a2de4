use chrono::{DateTime, Duration, Utc};
use showtime_catalog::{validate_selection, PricingCalculator};
use showtime_core::{
    CatalogError, Clock, ConflictQuery, ConflictScope, Reservation, ReservationStatus, ReservationStore,
    SeatEvent, SeatEventKind, StoreError, VenueCatalog,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{BookingView, CancelCommand, ConfirmCommand, ConfirmOutcome, HoldCommand, HoldReceipt};

/// Length of every hold. Fixed for all shows and venues.
pub const HOLD_WINDOW_SECONDS: i64 = 5 * 60;

const EVENT_BUFFER: usize = 256;

/// Seat reservation state machine: hold, confirm, cancel, fetch.
///
/// The engine keeps no mutable state of its own. All coordination between
/// concurrent requests goes through the [`ReservationStore`].
#[derive(Clone)]
pub struct ReservationEngine {
    catalog: Arc<dyn VenueCatalog>,
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<SeatEvent>,
}

impl ReservationEngine {
    pub fn new(catalog: Arc<dyn VenueCatalog>, store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            catalog,
            store,
            clock,
            events,
        }
    }

    /// Seat availability changes, for live seat maps.
    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> Arc<dyn ReservationStore> {
        self.store.clone()
    }

    /// Validate the request against the venue, check for competing claims,
    /// price the seats and persist a HELD reservation.
    #[instrument(skip_all, fields(show_id = ?cmd.show_id, seats = cmd.seats.len()))]
    pub async fn hold(&self, cmd: HoldCommand) -> Result<HoldReceipt, BookingError> {
        let context = cmd.context()?;

        let screen = self.catalog.get_screen(context.theatre_id, context.screen_id).await?;

        let show = self.catalog.get_show(context.show_id).await?;
        if show.theatre_id != context.theatre_id
            || show.screen_id != context.screen_id
            || show.movie_id != context.movie_id
        {
            return Err(BookingError::InvalidRequest(
                "Show does not match theatre/screen/movie".to_string(),
            ));
        }

        let movie = self.catalog.get_movie(context.movie_id).await?;

        validate_selection(&screen, &cmd.seats)?;

        let now = self.clock.now();
        let seat_ids: Vec<String> = cmd.seats.iter().map(|s| s.seat_id.clone()).collect();
        let query = ConflictQuery {
            show_id: context.show_id,
            seat_ids,
            scope: ConflictScope::ActiveAt(now),
            exclude: None,
        };
        if let Some(existing) = self.store.find_conflict(&query).await? {
            warn!(existing = %existing.id, "Hold refused, seats already claimed");
            return Err(BookingError::Conflict(
                "One or more seats already held or booked".to_string(),
            ));
        }

        let seats = PricingCalculator::new(movie.base_seat_price, &show.seat_type_multipliers).price(&cmd.seats);
        let hold_expires_at = now + Duration::seconds(HOLD_WINDOW_SECONDS);
        let reservation = Reservation::new_held(context, cmd.user_id, seats, now, hold_expires_at);

        if let Err(err) = self.store.insert_held(&reservation, now).await {
            if matches!(err, StoreError::SeatTaken { .. }) {
                warn!(error = %err, "Hold lost a race at the storage guard");
            }
            return Err(err.into());
        }

        info!(booking_id = %reservation.id, total = reservation.total_amount, "Seats held");
        self.publish(&reservation, SeatEventKind::Held, now);

        Ok(HoldReceipt {
            booking_id: reservation.id,
            hold_expires_at: reservation.hold_expires_at,
            total_amount: reservation.total_amount,
        })
    }

    /// Turn a live hold into a permanent booking. Replaying a confirm on a
    /// CONFIRMED booking succeeds without touching it.
    #[instrument(skip_all, fields(booking_id = ?cmd.booking_id))]
    pub async fn confirm(&self, cmd: ConfirmCommand) -> Result<ConfirmOutcome, BookingError> {
        let booking_id = cmd
            .booking_id
            .ok_or_else(|| BookingError::InvalidRequest("bookingId required".to_string()))?;

        let reservation = self.load(booking_id).await?;
        match reservation.status {
            ReservationStatus::Confirmed => return Ok(already_confirmed(booking_id)),
            ReservationStatus::Held => {}
            other => {
                return Err(BookingError::InvalidState(format!(
                    "Booking not in HELD state (currently {})",
                    other
                )))
            }
        }

        let now = self.clock.now();
        if reservation.is_hold_expired(now) {
            warn!(expired_at = %reservation.hold_expires_at, "Confirm after hold expiry");
            return Err(hold_expired());
        }

        let query = ConflictQuery {
            show_id: reservation.show_id(),
            seat_ids: reservation.seat_ids(),
            scope: ConflictScope::ConfirmedOnly,
            exclude: Some(booking_id),
        };
        if let Some(existing) = self.store.find_conflict(&query).await? {
            warn!(existing = %existing.id, "Confirm refused, seats booked by another reservation");
            return Err(BookingError::Conflict("Seats already booked".to_string()));
        }

        match self.store.confirm(booking_id, now).await {
            Ok(confirmed) => {
                info!(total = confirmed.total_amount, "Booking confirmed");
                self.publish(&confirmed, SeatEventKind::Confirmed, now);
                Ok(ConfirmOutcome {
                    booking_id,
                    already_confirmed: false,
                })
            }
            Err(StoreError::StaleState(_)) => self.settle_stale_confirm(booking_id, now).await,
            Err(err) => Err(err.into()),
        }
    }

    /// Release a hold before it lapses. Cancelling twice is harmless.
    #[instrument(skip_all, fields(booking_id = ?cmd.booking_id))]
    pub async fn cancel(&self, cmd: CancelCommand) -> Result<Uuid, BookingError> {
        let booking_id = cmd
            .booking_id
            .ok_or_else(|| BookingError::InvalidRequest("bookingId required".to_string()))?;

        let reservation = self.load(booking_id).await?;
        let now = self.clock.now();
        match reservation.effective_status(now) {
            ReservationStatus::Cancelled => return Ok(booking_id),
            ReservationStatus::Held => {}
            other => {
                return Err(BookingError::InvalidState(format!(
                    "Booking cannot be cancelled (currently {})",
                    other
                )))
            }
        }

        match self.store.cancel(booking_id, now).await {
            Ok(cancelled) => {
                info!("Hold cancelled");
                self.publish(&cancelled, SeatEventKind::Released, now);
                Ok(booking_id)
            }
            Err(StoreError::StaleState(_)) => {
                let current = self.load(booking_id).await?;
                match current.effective_status(now) {
                    ReservationStatus::Cancelled => Ok(booking_id),
                    other => Err(BookingError::InvalidState(format!(
                        "Booking cannot be cancelled (currently {})",
                        other
                    ))),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Read a reservation together with its theatre, show and movie.
    #[instrument(skip(self))]
    pub async fn fetch(&self, booking_id: Uuid) -> Result<BookingView, BookingError> {
        let reservation = self.load(booking_id).await?;
        let context = reservation.context;

        let (theatre, show, movie) = tokio::join!(
            self.catalog.get_theatre(context.theatre_id),
            self.catalog.get_show(context.show_id),
            self.catalog.get_movie(context.movie_id),
        );

        Ok(BookingView::assemble(
            reservation,
            self.clock.now(),
            optional(theatre)?,
            optional(show)?,
            optional(movie)?,
        ))
    }

    async fn load(&self, booking_id: Uuid) -> Result<Reservation, BookingError> {
        self.store
            .get(booking_id)
            .await?
            .ok_or_else(BookingError::booking_not_found)
    }

    /// The conditional HELD → CONFIRMED write lost to a concurrent change;
    /// re-read to report what actually happened.
    async fn settle_stale_confirm(&self, booking_id: Uuid, now: DateTime<Utc>) -> Result<ConfirmOutcome, BookingError> {
        let current = self.load(booking_id).await?;
        match current.status {
            ReservationStatus::Confirmed => Ok(already_confirmed(booking_id)),
            ReservationStatus::Held if current.is_hold_expired(now) => Err(hold_expired()),
            other => Err(BookingError::InvalidState(format!(
                "Booking not in HELD state (currently {})",
                other
            ))),
        }
    }

    fn publish(&self, reservation: &Reservation, kind: SeatEventKind, at: DateTime<Utc>) {
        let event = SeatEvent {
            show_id: reservation.show_id(),
            booking_id: reservation.id,
            seat_ids: reservation.seat_ids(),
            kind,
            at,
        };
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

fn already_confirmed(booking_id: Uuid) -> ConfirmOutcome {
    ConfirmOutcome {
        booking_id,
        already_confirmed: true,
    }
}

fn hold_expired() -> BookingError {
    BookingError::Expired("Hold expired".to_string())
}

fn optional<T>(result: Result<T, CatalogError>) -> Result<Option<T>, BookingError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CatalogError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
