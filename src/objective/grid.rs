//! Grid coefficient search
//!
//! Evaluates a fixed ladder of coefficients and keeps the one whose total cost
//! lands closest to the objective without exceeding it. The number of
//! evaluations depends only on the grid, never on the catalog size.

use std::iter;

use rust_decimal::Decimal;
use tracing::debug;

use super::{
    CoefficientSearch, LotDemand, ObjectiveError, ObjectiveSearchResult, has_base_cost, identity,
    total_cost_at,
};

/// A discretized coefficient range, `min..=max` in increments of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientGrid {
    min: Decimal,
    max: Decimal,
    step: Decimal,
}

impl CoefficientGrid {
    /// Create a grid.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectiveError::InvalidRange`] if `min` is not positive,
    /// `max < min`, or `step` is not positive.
    pub fn new(min: Decimal, max: Decimal, step: Decimal) -> Result<Self, ObjectiveError> {
        if min <= Decimal::ZERO || max < min || step <= Decimal::ZERO {
            return Err(ObjectiveError::InvalidRange { min, max, step });
        }

        Ok(Self { min, max, step })
    }

    /// Smallest coefficient evaluated.
    pub fn min(&self) -> Decimal {
        self.min
    }

    /// Largest coefficient evaluated.
    pub fn max(&self) -> Decimal {
        self.max
    }

    /// Coefficients in ascending order.
    pub fn candidates(&self) -> impl Iterator<Item = Decimal> {
        let (max, step) = (self.max, self.step);

        iter::successors(Some(self.min), move |current| current.checked_add(step))
            .take_while(move |coefficient| *coefficient <= max)
    }
}

impl Default for CoefficientGrid {
    /// 0.01 to 2.00 in steps of 0.01 (200 candidates).
    fn default() -> Self {
        Self {
            min: Decimal::new(1, 2),
            max: Decimal::new(200, 2),
            step: Decimal::new(1, 2),
        }
    }
}

impl CoefficientSearch for CoefficientGrid {
    fn search(&self, demands: &[LotDemand], objective_minor: i64) -> ObjectiveSearchResult {
        if !has_base_cost(demands) {
            return identity(demands, objective_minor);
        }

        let mut best: Option<(Decimal, i64)> = None;

        for coefficient in self.candidates() {
            let cost = total_cost_at(demands, coefficient);

            if cost > objective_minor {
                continue;
            }

            let gap = objective_minor.saturating_sub(cost);

            if best.is_none_or(|(_, best_gap)| gap < best_gap) {
                best = Some((coefficient, gap));
            }
        }

        match best {
            Some((coefficient, _)) => {
                ObjectiveSearchResult::at(demands, coefficient, objective_minor)
            }
            None => {
                debug!(objective_minor, min = %self.min, "no grid coefficient fits the objective");

                identity(demands, objective_minor)
            }
        }
    }
}
