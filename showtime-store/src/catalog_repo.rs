use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showtime_core::{CatalogError, Movie, Screen, SeatMapEntry, SeatTypeMultipliers, Show, Theatre, VenueCatalog};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Venue catalog read from the `theatres`, `screens`, `shows` and `movies` tables.
pub struct PgVenueCatalog {
    pool: PgPool,
}

impl PgVenueCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct TheatreRow {
    id: Uuid,
    name: String,
    address: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ScreenRow {
    id: Uuid,
    theatre_id: Uuid,
    name: String,
    row_count: i32,
    column_count: i32,
    seat_map: Json<Vec<SeatMapEntry>>,
}

#[derive(sqlx::FromRow)]
struct ShowRow {
    id: Uuid,
    theatre_id: Uuid,
    screen_id: Uuid,
    movie_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    seat_type_multipliers: Json<SeatTypeMultipliers>,
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    languages: Vec<String>,
    genres: Vec<String>,
    run_time_mins: Option<i32>,
    rating: Option<f64>,
    base_seat_price: f64,
}

#[async_trait]
impl VenueCatalog for PgVenueCatalog {
    async fn get_theatre(&self, theatre_id: Uuid) -> Result<Theatre, CatalogError> {
        let row: TheatreRow = sqlx::query_as("SELECT id, name, address FROM theatres WHERE id = $1")
            .bind(theatre_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CatalogError::backend)?
            .ok_or_else(|| CatalogError::not_found("Theatre", theatre_id))?;

        Ok(Theatre {
            id: row.id,
            name: row.name,
            address: row.address,
        })
    }

    async fn get_screen(&self, theatre_id: Uuid, screen_id: Uuid) -> Result<Screen, CatalogError> {
        let theatre_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM theatres WHERE id = $1)")
            .bind(theatre_id)
            .fetch_one(&self.pool)
            .await
            .map_err(CatalogError::backend)?;
        if !theatre_exists {
            return Err(CatalogError::not_found("Theatre", theatre_id));
        }

        // a screen of another theatre is as good as missing
        let row: ScreenRow = sqlx::query_as(
            "SELECT id, theatre_id, name, row_count, column_count, seat_map \
             FROM screens WHERE id = $1 AND theatre_id = $2",
        )
        .bind(screen_id)
        .bind(theatre_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CatalogError::backend)?
        .ok_or_else(|| CatalogError::not_found("Screen", screen_id))?;

        Ok(Screen {
            id: row.id,
            theatre_id: row.theatre_id,
            name: row.name,
            rows: row.row_count.max(0) as u32,
            columns: row.column_count.max(0) as u32,
            seat_map: row.seat_map.0,
        })
    }

    async fn get_show(&self, show_id: Uuid) -> Result<Show, CatalogError> {
        let row: ShowRow = sqlx::query_as(
            "SELECT id, theatre_id, screen_id, movie_id, start_time, end_time, seat_type_multipliers \
             FROM shows WHERE id = $1",
        )
        .bind(show_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CatalogError::backend)?
        .ok_or_else(|| CatalogError::not_found("Show", show_id))?;

        Ok(Show {
            id: row.id,
            theatre_id: row.theatre_id,
            screen_id: row.screen_id,
            movie_id: row.movie_id,
            start_time: row.start_time,
            end_time: row.end_time,
            seat_type_multipliers: row.seat_type_multipliers.0,
        })
    }

    async fn get_movie(&self, movie_id: Uuid) -> Result<Movie, CatalogError> {
        let row: MovieRow = sqlx::query_as(
            "SELECT id, title, languages, genres, run_time_mins, rating, base_seat_price \
             FROM movies WHERE id = $1",
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CatalogError::backend)?
        .ok_or_else(|| CatalogError::not_found("Movie", movie_id))?;

        Ok(Movie {
            id: row.id,
            title: row.title,
            languages: row.languages,
            genres: row.genres,
            run_time_mins: row.run_time_mins.map(|m| m.max(0) as u32),
            rating: row.rating,
            base_seat_price: row.base_seat_price,
        })
    }
}
