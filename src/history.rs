//! Monthly sales history

use smallvec::SmallVec;

use crate::months::{Month, MonthSet};

/// Coerce a raw numeric cell to a usable non-negative quantity.
///
/// Missing, NaN, infinite and negative values become zero.
pub fn sanitize_quantity(cell: Option<f64>) -> f64 {
    match cell {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Sales per calendar month over the prior period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlyHistory {
    values: [f64; 12],
}

impl MonthlyHistory {
    /// Create a history from twelve monthly values, sanitizing each one.
    pub fn new(values: [f64; 12]) -> Self {
        Self::from_cells(values.map(Some))
    }

    /// Create a history from raw cells in calendar order.
    ///
    /// Bad cells coerce to zero, missing trailing months are zero and extra
    /// cells are ignored.
    pub fn from_cells(cells: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut values = [0.0; 12];

        for (slot, cell) in values.iter_mut().zip(cells) {
            *slot = sanitize_quantity(cell);
        }

        Self { values }
    }

    /// Sales recorded for a month.
    pub fn get(&self, month: Month) -> f64 {
        self.values.get(month.index()).copied().unwrap_or_default()
    }

    /// Values for the selected months, in calendar order.
    pub fn select(&self, months: MonthSet) -> SmallVec<[f64; 12]> {
        months.iter().map(|month| self.get(month)).collect()
    }

    /// Total sales over the selected months.
    pub fn total(&self, months: MonthSet) -> f64 {
        months.iter().map(|month| self.get(month)).sum()
    }

    /// All twelve values in calendar order.
    pub fn values(&self) -> &[f64; 12] {
        &self.values
    }
}
