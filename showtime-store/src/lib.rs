pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod memory;
pub mod redis_repo;
pub mod reservation_repo;

pub use catalog_repo::PgVenueCatalog;
pub use database::DbClient;
pub use memory::{CatalogSeed, MemoryReservationStore, MemoryVenueCatalog};
pub use redis_repo::{RateLimitDecision, RedisClient, RequestCounter};
pub use reservation_repo::PgReservationStore;
