use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showtime_core::{
    ConflictQuery, ConflictScope, PricedSeat, Reservation, ReservationStatus, ReservationStore,
    SchedulingContext, StoreError,
};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

const RESERVATION_COLUMNS: &str = "id, theatre_id, screen_id, show_id, movie_id, user_id, seats, status, \
     hold_expires_at, total_amount, created_at, updated_at";

/// Claim a seat, or take over a claim whose hold has lapsed. Zero affected
/// rows means an active reservation owns the seat.
const CLAIM_SEAT_SQL: &str = r#"
    INSERT INTO seat_claims (show_id, seat_id, reservation_id, status, hold_expires_at)
    VALUES ($1, $2, $3, 'HELD', $4)
    ON CONFLICT (show_id, seat_id) DO UPDATE
    SET reservation_id = EXCLUDED.reservation_id,
        status = 'HELD',
        hold_expires_at = EXCLUDED.hold_expires_at
    WHERE seat_claims.status = 'HELD' AND seat_claims.hold_expires_at <= $5
"#;

/// Postgres-backed reservation store.
///
/// `reservations` is the durable record; `seat_claims` holds one row per
/// (show, seat) currently claimed and is the uniqueness guard behind holds.
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool.begin().await.map_err(StoreError::backend)
    }

    /// Row for `id` exists but failed a conditional update: stale, not missing.
    async fn stale_or_missing(&self, id: Uuid) -> StoreError {
        match self.get(id).await {
            Ok(Some(_)) => StoreError::StaleState(id),
            Ok(None) => StoreError::NotFound(id),
            Err(err) => err,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    theatre_id: Uuid,
    screen_id: Uuid,
    show_id: Uuid,
    movie_id: Uuid,
    user_id: Option<Uuid>,
    seats: Json<Vec<PricedSeat>>,
    status: String,
    hold_expires_at: DateTime<Utc>,
    total_amount: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ReservationStatus>().map_err(StoreError::backend)?;
        Ok(Reservation {
            id: row.id,
            context: SchedulingContext {
                theatre_id: row.theatre_id,
                screen_id: row.screen_id,
                show_id: row.show_id,
                movie_id: row.movie_id,
            },
            user_id: row.user_id,
            seats: row.seats.0,
            status,
            hold_expires_at: row.hold_expires_at,
            total_amount: row.total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn insert_held(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<(), StoreError> {
        let show_id = reservation.show_id();
        let mut seat_ids = reservation.seat_ids();

        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO reservations (id, theatre_id, screen_id, show_id, movie_id, user_id, seats, seat_ids,
                                      status, hold_expires_at, total_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.context.theatre_id)
        .bind(reservation.context.screen_id)
        .bind(show_id)
        .bind(reservation.context.movie_id)
        .bind(reservation.user_id)
        .bind(Json(&reservation.seats))
        .bind(&seat_ids)
        .bind(reservation.status.as_str())
        .bind(reservation.hold_expires_at)
        .bind(reservation.total_amount)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        // fixed lock order so overlapping holds cannot deadlock each other
        seat_ids.sort();
        for seat_id in seat_ids {
            let claimed = sqlx::query(CLAIM_SEAT_SQL)
                .bind(show_id)
                .bind(&seat_id)
                .bind(reservation.id)
                .bind(reservation.hold_expires_at)
                .bind(now)
                .execute(&mut *tx)
                .await;

            match claimed {
                Ok(result) if result.rows_affected() == 1 => {}
                Ok(_) => {
                    debug!(%show_id, %seat_id, "Seat claim refused");
                    return Err(StoreError::SeatTaken { show_id, seat_id });
                }
                Err(err) if is_unique_violation(&err) => {
                    return Err(StoreError::SeatTaken { show_id, seat_id });
                }
                Err(err) => return Err(StoreError::backend(err)),
            }
        }

        tx.commit().await.map_err(StoreError::backend)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let row: Option<ReservationRow> =
            sqlx::query_as(&format!("SELECT {} FROM reservations WHERE id = $1", RESERVATION_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn find_conflict(&self, query: &ConflictQuery) -> Result<Option<Reservation>, StoreError> {
        // served by idx_reservations_show_status_expiry plus the GIN index on seat_ids;
        // a NULL instant leaves only CONFIRMED rows matching
        let active_at = match query.scope {
            ConflictScope::ActiveAt(now) => Some(now),
            ConflictScope::ConfirmedOnly => None,
        };
        let sql = format!(
            "SELECT {} FROM reservations \
             WHERE show_id = $1 AND seat_ids && $2 \
             AND (status = 'CONFIRMED' OR (status = 'HELD' AND hold_expires_at > $3)) \
             AND ($4::uuid IS NULL OR id <> $4) \
             LIMIT 1",
            RESERVATION_COLUMNS
        );

        let row: Option<ReservationRow> = sqlx::query_as(&sql)
            .bind(query.show_id)
            .bind(&query.seat_ids)
            .bind(active_at)
            .bind(query.exclude)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn confirm(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, StoreError> {
        let mut tx = self.begin().await?;

        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "UPDATE reservations SET status = 'CONFIRMED', updated_at = $2 \
             WHERE id = $1 AND status = 'HELD' AND hold_expires_at > $2 \
             RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        let Some(row) = row else {
            drop(tx);
            return Err(self.stale_or_missing(id).await);
        };
        let reservation = Reservation::try_from(row)?;

        let promoted: Vec<String> = sqlx::query_scalar(
            "UPDATE seat_claims SET status = 'CONFIRMED' WHERE reservation_id = $1 RETURNING seat_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        // a claim that moved to another reservation means the seat is gone
        if let Some(lost) = reservation.seats.iter().find(|s| !promoted.contains(&s.seat_id)) {
            return Err(StoreError::SeatTaken {
                show_id: reservation.show_id(),
                seat_id: lost.seat_id.clone(),
            });
        }

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(reservation)
    }

    async fn cancel(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, StoreError> {
        let mut tx = self.begin().await?;

        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "UPDATE reservations SET status = 'CANCELLED', updated_at = $2 \
             WHERE id = $1 AND status = 'HELD' \
             RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        let Some(row) = row else {
            drop(tx);
            return Err(self.stale_or_missing(id).await);
        };

        sqlx::query("DELETE FROM seat_claims WHERE reservation_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Reservation::try_from(row)
    }

    async fn expire_stale_holds(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tx = self.begin().await?;

        let expired: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE reservations SET status = 'EXPIRED', updated_at = $1 \
             WHERE status = 'HELD' AND hold_expires_at <= $1 \
             RETURNING id",
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        if !expired.is_empty() {
            sqlx::query("DELETE FROM seat_claims WHERE reservation_id = ANY($1) AND status = 'HELD'")
                .bind(&expired)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::backend)?;
        }

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(expired.len() as u64)
    }
}
