pub mod pricing;
pub mod seat_map;

pub use pricing::PricingCalculator;
pub use seat_map::{validate_selection, SeatValidationError};
