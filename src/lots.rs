//! Lot Sizes

use std::{fmt, num::NonZeroU64};

use num_traits::ToPrimitive;

/// Quantity per package. Every ordered quantity is a whole multiple of it.
///
/// A lot size is never zero: missing or invalid values coerce to a lot of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LotSize(NonZeroU64);

impl LotSize {
    /// A lot of a single unit.
    pub const ONE: LotSize = LotSize(NonZeroU64::MIN);

    /// Create a lot size, coercing zero to one.
    pub fn new(size: u64) -> Self {
        NonZeroU64::new(size).map_or(Self::ONE, LotSize)
    }

    /// Create a lot size from a raw spreadsheet cell.
    ///
    /// Missing, non-finite and sub-unit values coerce to one. Fractional sizes
    /// are rounded up to the next whole unit.
    pub fn from_cell(cell: Option<f64>) -> Self {
        cell.filter(|value| value.is_finite())
            .and_then(|value| value.ceil().to_u64())
            .map_or(Self::ONE, Self::new)
    }

    /// The lot size as an integer.
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Round a quantity up to the nearest lot multiple.
    ///
    /// Negative and non-finite quantities round to zero.
    pub fn round_up(self, quantity: f64) -> u64 {
        self.lots_to_units(quantity / self.as_f64(), f64::ceil)
    }

    /// Round a quantity to the closest lot multiple (halves round away from zero).
    ///
    /// Negative and non-finite quantities round to zero.
    pub fn round_nearest(self, quantity: f64) -> u64 {
        self.lots_to_units(quantity / self.as_f64(), f64::round)
    }

    fn lots_to_units(self, lots: f64, round: fn(f64) -> f64) -> u64 {
        round(lots)
            .to_u64()
            .map_or(0, |lots| lots.saturating_mul(self.get()))
    }

    fn as_f64(self) -> f64 {
        self.get().to_f64().unwrap_or(1.0)
    }
}

impl Default for LotSize {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<u64> for LotSize {
    fn from(size: u64) -> Self {
        Self::new(size)
    }
}

impl fmt::Display for LotSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coerces_to_one() {
        assert_eq!(LotSize::new(0), LotSize::ONE);
        assert_eq!(LotSize::new(0).get(), 1);
    }

    #[test]
    fn from_cell_coerces_bad_values() {
        assert_eq!(LotSize::from_cell(None), LotSize::ONE);
        assert_eq!(LotSize::from_cell(Some(f64::NAN)), LotSize::ONE);
        assert_eq!(LotSize::from_cell(Some(f64::INFINITY)), LotSize::ONE);
        assert_eq!(LotSize::from_cell(Some(-4.0)), LotSize::ONE);
        assert_eq!(LotSize::from_cell(Some(0.0)), LotSize::ONE);
        assert_eq!(LotSize::from_cell(Some(2.5)).get(), 3);
        assert_eq!(LotSize::from_cell(Some(12.0)).get(), 12);
    }

    #[test]
    fn round_up_to_lot_multiple() {
        let lot = LotSize::new(5);

        assert_eq!(lot.round_up(10.5), 15);
        assert_eq!(lot.round_up(10.0), 10);
        assert_eq!(lot.round_up(0.1), 5);
        assert_eq!(lot.round_up(0.0), 0);
    }

    #[test]
    fn round_nearest_to_lot_multiple() {
        let lot = LotSize::new(5);

        assert_eq!(lot.round_nearest(12.4), 10);
        assert_eq!(lot.round_nearest(12.5), 15);
        assert_eq!(lot.round_nearest(2.0), 0);
    }

    #[test]
    fn rounding_bad_quantities_gives_zero() {
        let lot = LotSize::new(6);

        assert_eq!(lot.round_up(f64::NAN), 0);
        assert_eq!(lot.round_up(f64::INFINITY), 0);
        assert_eq!(lot.round_up(-13.0), 0);
        assert_eq!(lot.round_nearest(f64::NEG_INFINITY), 0);
    }
}
