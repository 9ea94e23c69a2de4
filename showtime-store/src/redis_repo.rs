use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use std::net::IpAddr;

/// Outcome of counting one request against a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub count: i64,
    pub limit: i64,
}

impl RateLimitDecision {
    pub fn allowed(&self) -> bool {
        self.count <= self.limit
    }

    pub fn remaining(&self) -> i64 {
        (self.limit - self.count).max(0)
    }
}

/// Per-client request counting behind the API rate limiter.
#[async_trait]
pub trait RequestCounter: Send + Sync {
    async fn count_request(&self, client_ip: IpAddr, limit: i64, window_seconds: i64)
        -> RedisResult<RateLimitDecision>;
}

/// Fixed-window request counter kept in Redis.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    fn window_key(client_ip: IpAddr) -> String {
        format!("showtime:ratelimit:{}", client_ip)
    }
}

#[async_trait]
impl RequestCounter for RedisClient {
    /// Count one request from `client_ip`. The window starts at the first
    /// request and is not extended by later ones.
    async fn count_request(
        &self,
        client_ip: IpAddr,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<RateLimitDecision> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::window_key(client_ip);

        let count: i64 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(&key, window_seconds).await?;
        }

        Ok(RateLimitDecision { count, limit })
    }
}
