//! Objective Matching
//!
//! Strategies that scale or fill per-product purchase quantities so the total
//! cost approaches a monetary objective from below.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    lots::LotSize,
    months::MonthSet,
    products::{ProductKey, ProductLine, cost_minor},
};

pub mod bisection;
pub mod greedy;
pub mod grid;

/// Errors raised while configuring an objective strategy.
#[derive(Debug, Error, PartialEq)]
pub enum ObjectiveError {
    /// The coefficient range is empty, non-positive, or the step is not positive.
    #[error("invalid coefficient range {min}..={max} (step {step})")]
    InvalidRange {
        /// Smallest coefficient
        min: Decimal,
        /// Largest coefficient
        max: Decimal,
        /// Distance between candidates
        step: Decimal,
    },
}

/// What one product contributes to an objective search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotDemand {
    /// Product the demand belongs to
    pub key: ProductKey,

    /// Unscaled quantity (usually the historical volume)
    pub base_quantity: Decimal,

    /// Quantity per package
    pub lot_size: LotSize,

    /// Unit cost in minor units
    pub unit_cost_minor: i64,
}

impl LotDemand {
    /// Create a demand. Non-finite or negative base quantities count as zero;
    /// quantities beyond the decimal range saturate.
    pub fn new(
        key: ProductKey,
        base_quantity: f64,
        lot_size: LotSize,
        unit_cost_minor: i64,
    ) -> Self {
        let base_quantity = if base_quantity.is_finite() && base_quantity > 0.0 {
            Decimal::from_f64(base_quantity).unwrap_or(if base_quantity >= 1.0 {
                Decimal::MAX
            } else {
                Decimal::ZERO
            })
        } else {
            Decimal::ZERO
        };

        Self {
            key,
            base_quantity,
            lot_size,
            unit_cost_minor: unit_cost_minor.max(0),
        }
    }

    /// Demand for a catalog product, based on its history over the selected months.
    pub fn from_product(key: ProductKey, product: &ProductLine<'_>, months: MonthSet) -> Self {
        Self::new(
            key,
            product.history.total(months),
            product.lot_size,
            product.unit_cost().to_minor_units(),
        )
    }

    /// Quantity ordered at `coefficient`: the scaled base, rounded up to a whole lot.
    ///
    /// Saturates instead of overflowing.
    pub fn quantity_at(&self, coefficient: Decimal) -> u64 {
        let lot = Decimal::from(self.lot_size.get());

        self.base_quantity
            .checked_mul(coefficient)
            .and_then(|scaled| scaled.checked_div(lot))
            .and_then(|lots| lots.ceil().to_u64())
            .unwrap_or(u64::MAX)
            .saturating_mul(self.lot_size.get())
    }

    /// Cost in minor units of the quantity ordered at `coefficient`.
    pub fn cost_at(&self, coefficient: Decimal) -> i64 {
        cost_minor(self.unit_cost_minor, self.quantity_at(coefficient))
    }

    /// Cost in minor units of a single lot.
    pub fn cost_per_lot(&self) -> i64 {
        cost_minor(self.unit_cost_minor, self.lot_size.get())
    }

    /// Cost in minor units of the unscaled base quantity, rounded half away from zero.
    pub fn base_cost_minor(&self) -> i64 {
        self.base_quantity
            .checked_mul(Decimal::from(self.unit_cost_minor))
            .map(|cost| cost.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cost| cost.to_i64())
            .unwrap_or(i64::MAX)
    }

    fn has_base_cost(&self) -> bool {
        !self.base_quantity.is_zero() && self.unit_cost_minor > 0
    }
}

/// Total cost in minor units of every demand at `coefficient`.
pub fn total_cost_at(demands: &[LotDemand], coefficient: Decimal) -> i64 {
    demands
        .iter()
        .map(|demand| demand.cost_at(coefficient))
        .fold(0, i64::saturating_add)
}

/// Outcome of a coefficient search.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveSearchResult {
    /// Multiplier applied uniformly to every base quantity
    pub coefficient: Decimal,

    /// Total cost in minor units at that coefficient
    pub achieved_minor: i64,

    /// Ordered quantity per product
    pub quantities: FxHashMap<ProductKey, u64>,

    /// Whether the achieved total stays within the objective
    pub within_objective: bool,
}

impl ObjectiveSearchResult {
    /// Evaluate every demand at `coefficient`.
    pub fn at(demands: &[LotDemand], coefficient: Decimal, objective_minor: i64) -> Self {
        let quantities: FxHashMap<ProductKey, u64> = demands
            .iter()
            .map(|demand| (demand.key, demand.quantity_at(coefficient)))
            .collect();

        let achieved_minor = total_cost_at(demands, coefficient);

        Self {
            coefficient,
            achieved_minor,
            quantities,
            within_objective: achieved_minor <= objective_minor,
        }
    }

    /// Ordered quantity for a product (zero when the product was not searched).
    pub fn quantity(&self, key: ProductKey) -> u64 {
        self.quantities.get(&key).copied().unwrap_or_default()
    }
}

/// Finds one multiplier, shared by every product, bringing total cost as close
/// as possible to an objective without exceeding it.
pub trait CoefficientSearch {
    /// Search for the coefficient.
    ///
    /// When no coefficient fits, the result is evaluated at 1.0 and flagged as
    /// not within the objective.
    fn search(&self, demands: &[LotDemand], objective_minor: i64) -> ObjectiveSearchResult;
}

/// The identity result used when no scaling can change the total, or when
/// nothing fits.
pub(crate) fn identity(demands: &[LotDemand], objective_minor: i64) -> ObjectiveSearchResult {
    ObjectiveSearchResult::at(demands, Decimal::ONE, objective_minor)
}

/// Whether scaling has any effect on the total cost.
pub(crate) fn has_base_cost(demands: &[LotDemand]) -> bool {
    demands.iter().any(LotDemand::has_base_cost)
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn keys(n: usize) -> Vec<ProductKey> {
        let mut map = SlotMap::<ProductKey, ()>::with_key();

        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn quantity_at_rounds_up_to_lot() {
        let key = keys(1).into_iter().next().unwrap_or_default();
        let demand = LotDemand::new(key, 50.0, LotSize::new(5), 300);

        assert_eq!(demand.quantity_at(Decimal::new(143, 2)), 75);
        assert_eq!(demand.quantity_at(Decimal::ONE), 50);
        assert_eq!(demand.cost_at(Decimal::new(143, 2)), 22_500);
    }

    #[test]
    fn quantity_at_is_exact_for_decimal_coefficients() {
        let key = keys(1).into_iter().next().unwrap_or_default();
        let demand = LotDemand::new(key, 100.0, LotSize::new(10), 200);

        // 100 * 1.30 is exactly 130, so no extra lot is added.
        assert_eq!(demand.quantity_at(Decimal::new(130, 2)), 130);
        assert_eq!(demand.quantity_at(Decimal::new(131, 2)), 140);
    }

    #[test]
    fn bad_inputs_are_coerced() {
        let key = keys(1).into_iter().next().unwrap_or_default();
        let nan = LotDemand::new(key, f64::NAN, LotSize::ONE, -50);
        let negative = LotDemand::new(key, -10.0, LotSize::ONE, 50);

        assert_eq!(nan.base_quantity, Decimal::ZERO);
        assert_eq!(nan.unit_cost_minor, 0);
        assert_eq!(negative.base_quantity, Decimal::ZERO);
        assert!(!has_base_cost(&[nan, negative]));
    }

    #[test]
    fn huge_base_quantity_saturates() {
        let key = keys(1).into_iter().next().unwrap_or_default();
        let demand = LotDemand::new(key, 1e30, LotSize::new(6), 100);

        assert_eq!(demand.base_quantity, Decimal::MAX);
        assert_eq!(demand.quantity_at(Decimal::ONE), u64::MAX);
        assert_eq!(demand.cost_at(Decimal::ONE), i64::MAX);
        assert_eq!(demand.base_cost_minor(), i64::MAX);
        assert!(has_base_cost(&[demand]));
    }

    #[test]
    fn result_at_reports_feasibility() {
        let keys = keys(2);
        let demands: Vec<LotDemand> = keys
            .iter()
            .zip([(100.0, 10, 200), (50.0, 5, 300)])
            .map(|(key, (base, lot, cost))| LotDemand::new(*key, base, LotSize::new(lot), cost))
            .collect();

        let result = ObjectiveSearchResult::at(&demands, Decimal::ONE, 30_000);

        assert_eq!(result.achieved_minor, 35_000);
        assert!(!result.within_objective);
        assert_eq!(result.quantity(keys.first().copied().unwrap_or_default()), 100);
    }
}
