//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::{history::MonthlyHistory, lots::LotSize};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// A catalog row: one purchasable product and its prior-period sales.
#[derive(Debug, Clone)]
pub struct ProductLine<'a> {
    /// Supplier reference
    pub supplier_ref: String,

    /// Product reference
    pub product_ref: String,

    /// Product label
    pub label: String,

    /// Sales per calendar month over the prior period
    pub history: MonthlyHistory,

    /// Unit cost
    unit_cost: Money<'a, Currency>,

    /// Quantity per package
    pub lot_size: LotSize,

    /// Units currently in stock (reporting only)
    pub stock: f64,
}

impl<'a> ProductLine<'a> {
    /// Create a product line. Negative unit costs are coerced to zero.
    pub fn new(
        product_ref: impl Into<String>,
        history: MonthlyHistory,
        unit_cost: Money<'a, Currency>,
        lot_size: LotSize,
    ) -> Self {
        Self {
            supplier_ref: String::new(),
            product_ref: product_ref.into(),
            label: String::new(),
            history,
            unit_cost: non_negative(unit_cost),
            lot_size,
            stock: 0.0,
        }
    }

    /// Set the supplier reference.
    #[must_use]
    pub fn with_supplier(mut self, supplier_ref: impl Into<String>) -> Self {
        self.supplier_ref = supplier_ref.into();
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the stock on hand. Bad values are coerced to zero.
    #[must_use]
    pub fn with_stock(mut self, stock: f64) -> Self {
        self.stock = crate::history::sanitize_quantity(Some(stock));
        self
    }

    /// Unit cost
    pub fn unit_cost(&self) -> &Money<'a, Currency> {
        &self.unit_cost
    }
}

/// Cost in minor units of `quantity` units at `unit_cost_minor` each, saturating.
pub fn cost_minor(unit_cost_minor: i64, quantity: u64) -> i64 {
    i64::try_from(quantity)
        .unwrap_or(i64::MAX)
        .saturating_mul(unit_cost_minor)
}

fn non_negative(money: Money<'_, Currency>) -> Money<'_, Currency> {
    if money.to_minor_units() < 0 {
        Money::from_minor(0, money.currency())
    } else {
        money
    }
}
