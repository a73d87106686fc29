//! Monthly Allocation
//!
//! Spreads a target quantity over the selected months following a seasonality
//! vector, in whole lots, then reconciles rounding so the months add back up to
//! the target.

use num_traits::ToPrimitive;
use serde::Deserialize;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    history::sanitize_quantity,
    lots::LotSize,
    months::{Month, MonthSet},
};

/// How raw monthly targets are snapped to lot multiples before reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Round every month up to the next lot. Never under-allocates a month
    /// before reconciliation.
    #[default]
    Ceiling,

    /// Round every month to the closest lot.
    Nearest,
}

impl Rounding {
    fn apply(self, lot_size: LotSize, quantity: f64) -> u64 {
        match self {
            Rounding::Ceiling => lot_size.round_up(quantity),
            Rounding::Nearest => lot_size.round_nearest(quantity),
        }
    }
}

/// Monthly order quantities for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    quantities: SmallVec<[u64; 12]>,
    target: u64,
    lot_size: LotSize,
}

impl Allocation {
    fn zeroed(slots: usize, target: u64, lot_size: LotSize) -> Self {
        Self {
            quantities: SmallVec::from_elem(0, slots),
            target,
            lot_size,
        }
    }

    /// Quantity per selected month, in selection order.
    pub fn quantities(&self) -> &[u64] {
        &self.quantities
    }

    /// Quantities paired with the months they belong to.
    pub fn by_month(&self, months: MonthSet) -> impl Iterator<Item = (Month, u64)> {
        months.iter().zip(self.quantities.iter().copied())
    }

    /// Sum of the monthly quantities.
    pub fn total(&self) -> u64 {
        self.quantities
            .iter()
            .fold(0, |total, quantity| total.saturating_add(*quantity))
    }

    /// The quantity that was requested.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Lot size every quantity is a multiple of.
    pub fn lot_size(&self) -> LotSize {
        self.lot_size
    }

    /// Requested minus allocated. Non-zero when reconciliation could not
    /// close the gap in whole lots.
    pub fn residual(&self) -> i64 {
        let target = i128::from(self.target);
        let total = i128::from(self.total());

        (target - total).to_i64().unwrap_or(i64::MAX)
    }

    /// Whether the months add up to the target exactly.
    pub fn is_exact(&self) -> bool {
        self.total() == self.target
    }
}

/// Converts a target total into monthly lot multiples.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyAllocator {
    rounding: Rounding,
}

impl MonthlyAllocator {
    /// Create an allocator using the given rounding.
    pub const fn new(rounding: Rounding) -> Self {
        Self { rounding }
    }

    /// Rounding applied before reconciliation.
    pub const fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Allocate `total_qty` over the months described by `weights`.
    ///
    /// A non-positive total or an all-zero weight vector yields all-zero
    /// months. Weights that are not finite or negative count as zero. The
    /// returned months always add up to `total_qty` when it is a multiple of
    /// the lot size; otherwise [`Allocation::residual`] reports the remainder.
    pub fn allocate(&self, total_qty: i64, weights: &[f64], lot_size: LotSize) -> Allocation {
        let target = u64::try_from(total_qty).unwrap_or(0);

        let weights: SmallVec<[f64; 12]> = weights
            .iter()
            .map(|weight| sanitize_quantity(Some(*weight)))
            .collect();

        if target == 0 || weights.iter().all(|weight| *weight <= 0.0) {
            return Allocation::zeroed(weights.len(), target, lot_size);
        }

        let total = target.to_f64().unwrap_or_default();

        let mut quantities: SmallVec<[u64; 12]> = weights
            .iter()
            .map(|weight| self.rounding.apply(lot_size, total * weight))
            .collect();

        reconcile(&mut quantities, &weights, target, lot_size);

        let allocation = Allocation {
            quantities,
            target,
            lot_size,
        };

        if !allocation.is_exact() {
            debug!(
                target,
                allocated = allocation.total(),
                lot_size = lot_size.get(),
                "monthly allocation left a residual"
            );
        }

        allocation
    }
}

/// Allocate with ceiling rounding.
pub fn allocate(total_qty: i64, weights: &[f64], lot_size: LotSize) -> Allocation {
    MonthlyAllocator::default().allocate(total_qty, weights, lot_size)
}

/// Move whole lots between months until the sum matches `target`.
///
/// Overshoot removes a lot from the largest month (first on ties). Undershoot
/// of at least one lot adds a lot to the heaviest-weighted month (first on
/// ties). A gap smaller than one lot is left as a residual.
fn reconcile(quantities: &mut [u64], weights: &[f64], target: u64, lot_size: LotSize) {
    let lot = lot_size.get();
    let mut sum = quantities
        .iter()
        .fold(0_u64, |total, quantity| total.saturating_add(*quantity));

    // Every step moves the sum one lot closer to the target.
    let max_steps = sum.abs_diff(target) / lot + 1;

    for _ in 0..max_steps {
        if sum > target {
            let Some(largest) = largest_month(quantities, lot) else {
                break;
            };

            *largest -= lot;
            sum -= lot;
        } else if target - sum >= lot {
            let Some(heaviest) = heaviest_month(quantities, weights) else {
                break;
            };

            *heaviest = heaviest.saturating_add(lot);
            sum = sum.saturating_add(lot);
        } else {
            break;
        }
    }
}

fn largest_month(quantities: &mut [u64], lot: u64) -> Option<&mut u64> {
    quantities
        .iter_mut()
        .filter(|quantity| **quantity >= lot)
        .reduce(|best, candidate| if *candidate > *best { candidate } else { best })
}

fn heaviest_month<'q>(quantities: &'q mut [u64], weights: &[f64]) -> Option<&'q mut u64> {
    weights
        .iter()
        .zip(quantities.iter_mut())
        .reduce(|best, candidate| if candidate.0 > best.0 { candidate } else { best })
        .map(|(_, quantity)| quantity)
}
