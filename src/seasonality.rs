//! Seasonality
//!
//! Per-product weight vectors describing how historical volume is spread over
//! the selected months.

use num_traits::ToPrimitive;
use smallvec::SmallVec;

use crate::{history::sanitize_quantity, months::MonthSet, products::ProductLine};

/// Normalized monthly weights, one per selected month, summing to one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonalityVector {
    weights: SmallVec<[f64; 12]>,
}

impl SeasonalityVector {
    /// Derive weights from historical values aligned to the selected months.
    ///
    /// Non-finite and negative values count as zero. When the included history
    /// sums to zero the weights are uniform, so a target can still be spread.
    pub fn compute(history: &[f64]) -> Self {
        let values: SmallVec<[f64; 12]> = history
            .iter()
            .map(|value| sanitize_quantity(Some(*value)))
            .collect();

        let sum: f64 = values.iter().sum();

        let weights = if sum > 0.0 {
            values.iter().map(|value| value / sum).collect()
        } else {
            Self::uniform(values.len()).weights
        };

        Self { weights }
    }

    /// Derive a product's weights over the selected months.
    pub fn for_product(product: &ProductLine<'_>, months: MonthSet) -> Self {
        Self::compute(&product.history.select(months))
    }

    /// A uniform distribution over `len` months.
    pub fn uniform(len: usize) -> Self {
        let share = len.to_f64().map_or(0.0, |len| 1.0 / len);

        Self {
            weights: SmallVec::from_elem(share, len),
        }
    }

    /// Weights in selection order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of months covered.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector covers no months.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};

    use crate::{history::MonthlyHistory, lots::LotSize, months::Month};

    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn zero_history_gives_uniform_weights() {
        let vector = SeasonalityVector::compute(&[0.0; 12]);

        assert_eq!(vector.len(), 12);
        for weight in vector.weights() {
            assert_close(*weight, 1.0 / 12.0);
        }
        assert_close(vector.weights().iter().sum(), 1.0);
    }

    #[test]
    fn weights_are_proportional_to_history() {
        let vector = SeasonalityVector::compute(&[10.0, 30.0, 0.0, 60.0]);

        assert_eq!(vector.weights(), &[0.1, 0.3, 0.0, 0.6]);
    }

    #[test]
    fn malformed_values_count_as_zero() {
        let vector = SeasonalityVector::compute(&[f64::NAN, 5.0, f64::INFINITY, -5.0]);

        assert_eq!(vector.weights(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn malformed_only_history_is_uniform() {
        let vector = SeasonalityVector::compute(&[f64::NAN, f64::NEG_INFINITY]);

        assert_eq!(vector.weights(), &[0.5, 0.5]);
    }

    #[test]
    fn empty_history_gives_empty_vector() {
        let vector = SeasonalityVector::compute(&[]);

        assert!(vector.is_empty());
    }

    #[test]
    fn for_product_uses_the_month_selection() {
        let product = ProductLine::new(
            "SKU",
            MonthlyHistory::new([
                20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 60.0, 0.0, 0.0, 0.0, 0.0, 1000.0,
            ]),
            Money::from_minor(100, GBP),
            LotSize::ONE,
        );

        let months = MonthSet::from_months([Month::January, Month::July]);
        let vector = SeasonalityVector::for_product(&product, months);

        assert_eq!(vector.weights(), &[0.25, 0.75]);
    }
}
