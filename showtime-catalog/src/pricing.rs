use showtime_core::{PricedSeat, SeatDescriptor, SeatType, SeatTypeMultipliers};

/// Stateless seat pricing: `round(base_seat_price * multiplier(seat_type))`.
///
/// Rounding is half away from zero, so 187.5 prices at 188.
#[derive(Debug, Clone, Copy)]
pub struct PricingCalculator<'a> {
    base_seat_price: f64,
    multipliers: &'a SeatTypeMultipliers,
}

impl<'a> PricingCalculator<'a> {
    pub fn new(base_seat_price: f64, multipliers: &'a SeatTypeMultipliers) -> Self {
        Self {
            base_seat_price,
            multipliers,
        }
    }

    pub fn seat_price(&self, seat_type: SeatType) -> i64 {
        (self.base_seat_price * self.multipliers.multiplier(seat_type)).round() as i64
    }

    /// Price each seat in request order. The reservation derives its total
    /// from these prices.
    pub fn price(&self, seats: &[SeatDescriptor]) -> Vec<PricedSeat> {
        seats
            .iter()
            .map(|s| PricedSeat {
                seat_id: s.seat_id.clone(),
                seat_type: s.seat_type,
                price: self.seat_price(s.seat_type),
            })
            .collect()
    }
}
