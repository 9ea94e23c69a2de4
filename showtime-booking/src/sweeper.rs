use showtime_core::{Clock, ReservationStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically rewrites lapsed holds as EXPIRED.
///
/// Purely housekeeping: availability checks already treat a lapsed hold as
/// free whether or not a sweep has run.
pub struct HoldSweeper {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl HoldSweeper {
    /// `interval` is raised to one second when shorter.
    pub fn new(store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!(requested_ms = interval.as_millis() as u64, "Sweep interval too short, using 1s");
        }
        Self {
            store,
            clock,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn sweep_once(&self) -> Result<u64, StoreError> {
        let expired = self.store.expire_stale_holds(self.clock.now()).await?;
        if expired > 0 {
            info!(expired, "Expired stale holds");
        } else {
            debug!("No stale holds");
        }
        Ok(expired)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Hold sweeper started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep_once().await {
                error!("Hold sweep failed: {}", e);
            }
        }
    }
}
