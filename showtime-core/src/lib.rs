pub mod clock;
pub mod events;
pub mod repository;
pub mod reservation;
pub mod seat;
pub mod venue;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{SeatEvent, SeatEventKind};
pub use repository::{
    CatalogError, ConflictQuery, ConflictScope, ReservationStore, StoreError, VenueCatalog,
};
pub use reservation::{Reservation, ReservationStatus, SchedulingContext};
pub use seat::{PricedSeat, SeatDescriptor, SeatType};
pub use venue::{Movie, Screen, SeatMapEntry, SeatTypeMultipliers, Show, Theatre};
