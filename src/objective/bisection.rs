//! Bisection coefficient search
//!
//! Total cost never decreases as the coefficient grows, so the largest
//! coefficient whose cost fits the objective is also the one closest to it.
//! Bisection narrows down on that coefficient with a fixed number of
//! evaluations instead of walking a grid.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::{
    CoefficientSearch, LotDemand, ObjectiveError, ObjectiveSearchResult, has_base_cost, identity,
    total_cost_at,
};

/// Bisection over `min..=max` with a fixed iteration budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BisectionSearch {
    min: Decimal,
    max: Decimal,
    iterations: u32,
}

impl BisectionSearch {
    /// Decimal places kept on the reported coefficient.
    const PRECISION: u32 = 6;

    /// Create a bisection search.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectiveError::InvalidRange`] if `min` is not positive or
    /// `max < min`.
    pub fn new(min: Decimal, max: Decimal, iterations: u32) -> Result<Self, ObjectiveError> {
        if min <= Decimal::ZERO || max < min {
            return Err(ObjectiveError::InvalidRange {
                min,
                max,
                step: Decimal::ZERO,
            });
        }

        Ok(Self {
            min,
            max,
            iterations,
        })
    }

    /// Number of halvings performed.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for BisectionSearch {
    /// Same interval as the default grid, 0.01 to 2.00, halved 32 times.
    fn default() -> Self {
        Self {
            min: Decimal::new(1, 2),
            max: Decimal::new(200, 2),
            iterations: 32,
        }
    }
}

impl CoefficientSearch for BisectionSearch {
    fn search(&self, demands: &[LotDemand], objective_minor: i64) -> ObjectiveSearchResult {
        if !has_base_cost(demands) {
            return identity(demands, objective_minor);
        }

        let fits = |coefficient: Decimal| total_cost_at(demands, coefficient) <= objective_minor;

        if !fits(self.min) {
            debug!(objective_minor, min = %self.min, "no coefficient fits the objective");

            return identity(demands, objective_minor);
        }

        if fits(self.max) {
            return ObjectiveSearchResult::at(demands, self.max, objective_minor);
        }

        // Invariant: `low` fits, `high` does not.
        let (mut low, mut high) = (self.min, self.max);
        let two = Decimal::TWO;

        for _ in 0..self.iterations {
            let Some(mid) = low.checked_add(high).and_then(|sum| sum.checked_div(two)) else {
                break;
            };

            if fits(mid) {
                low = mid;
            } else {
                high = mid;
            }
        }

        // Truncating can only lower the coefficient, which keeps it feasible.
        let coefficient = low
            .round_dp_with_strategy(Self::PRECISION, RoundingStrategy::ToZero)
            .max(self.min);

        ObjectiveSearchResult::at(demands, coefficient, objective_minor)
    }
}
