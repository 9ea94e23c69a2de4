use showtime_booking::ReservationEngine;
use showtime_store::RequestCounter;
use std::sync::Arc;

#[derive(Clone)]
pub struct RateLimiter {
    pub counter: Arc<dyn RequestCounter>,
    pub requests_per_window: i64,
    pub window_seconds: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: ReservationEngine,
    /// Absent when no Redis is configured; requests are then never throttled.
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(engine: ReservationEngine) -> Self {
        Self {
            engine,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }
}
