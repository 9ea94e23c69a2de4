pub mod engine;
pub mod error;
pub mod models;
pub mod sweeper;

pub use engine::{ReservationEngine, HOLD_WINDOW_SECONDS};
pub use error::BookingError;
pub use models::{BookingView, CancelCommand, ConfirmCommand, ConfirmOutcome, HoldCommand, HoldReceipt};
pub use sweeper::HoldSweeper;
