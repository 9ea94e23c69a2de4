use anyhow::Context;
use showtime_api::{app, AppState, RateLimiter};
use showtime_booking::{HoldSweeper, ReservationEngine};
use showtime_core::{Clock, ReservationStore, SystemClock, VenueCatalog};
use showtime_store::{app_config::Config, DbClient, MemoryReservationStore, MemoryVenueCatalog, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showtime_api=debug,showtime_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Showtime API on port {}", config.server.port);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (catalog, store): (Arc<dyn VenueCatalog>, Arc<dyn ReservationStore>) = match &config.database {
        Some(database) => {
            let db = DbClient::connect(database).await.context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            let catalog: Arc<dyn VenueCatalog> = Arc::new(db.venue_catalog());
            let store: Arc<dyn ReservationStore> = Arc::new(db.reservation_store());
            (catalog, store)
        }
        None => {
            tracing::warn!("No database configured, reservations are kept in memory");
            let catalog = match &config.catalog_seed {
                Some(path) => {
                    let seed = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("Failed to read catalog seed {}", path))?;
                    MemoryVenueCatalog::from_json(&seed).context("Invalid catalog seed")?
                }
                None => MemoryVenueCatalog::new(),
            };
            let catalog: Arc<dyn VenueCatalog> = Arc::new(catalog);
            let store: Arc<dyn ReservationStore> = Arc::new(MemoryReservationStore::new());
            (catalog, store)
        }
    };

    if config.sweeper.enabled {
        HoldSweeper::new(store.clone(), clock.clone(), Duration::from_secs(config.sweeper.interval_seconds)).spawn();
    }

    let engine = ReservationEngine::new(catalog, store, clock);
    let mut app_state = AppState::new(engine);

    if let Some(redis) = &config.redis {
        let client = RedisClient::new(&redis.url).context("Failed to create Redis client")?;
        app_state = app_state.with_rate_limiter(RateLimiter {
            counter: Arc::new(client),
            requests_per_window: config.rate_limit.requests_per_window,
            window_seconds: config.rate_limit.window_seconds,
        });
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
