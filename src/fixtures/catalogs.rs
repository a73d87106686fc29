//! Catalog Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    allocation::Rounding,
    fixtures::FixtureError,
    history::MonthlyHistory,
    lots::LotSize,
    months::{Month, MonthSet},
    objective::{bisection::BisectionSearch, greedy::GreedyLotFiller, grid::CoefficientGrid},
    plan::{ObjectiveStrategy, PlanParameters},
    products::ProductLine,
};

/// Catalog file contents
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Catalog currency code (e.g., "GBP")
    pub currency: String,

    /// Planning parameters
    #[serde(default)]
    pub parameters: ParametersFixture,

    /// Product rows, in catalog order
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product reference, unique within the file
    pub reference: String,

    /// Supplier reference
    #[serde(default)]
    pub supplier: String,

    /// Product label
    #[serde(default)]
    pub label: String,

    /// Unit cost (e.g., "2.99 GBP")
    pub price: String,

    /// Quantity per package; missing or invalid values mean 1
    #[serde(default)]
    pub lot_size: Option<f64>,

    /// Units in stock
    #[serde(default)]
    pub stock: Option<f64>,

    /// Monthly sales from January; blank cells count as zero
    #[serde(default)]
    pub history: Vec<Option<f64>>,
}

impl TryFrom<ProductFixture> for ProductLine<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        let product = ProductLine::new(
            fixture.reference,
            MonthlyHistory::from_cells(fixture.history),
            Money::from_minor(minor_units, currency),
            LotSize::from_cell(fixture.lot_size),
        )
        .with_supplier(fixture.supplier)
        .with_label(fixture.label)
        .with_stock(fixture.stock.unwrap_or_default());

        Ok(product)
    }
}

/// Objective strategy names accepted in fixtures and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Coefficient grid scan
    #[default]
    Grid,

    /// Coefficient bisection
    Bisection,

    /// Cheapest-lot-first filling
    Greedy,
}

impl StrategyKind {
    /// Build the strategy with its default settings.
    pub fn strategy(self, max_rounds: Option<u32>) -> ObjectiveStrategy {
        match self {
            StrategyKind::Grid => ObjectiveStrategy::Grid(CoefficientGrid::default()),
            StrategyKind::Bisection => ObjectiveStrategy::Bisection(BisectionSearch::default()),
            StrategyKind::Greedy => ObjectiveStrategy::Greedy(
                max_rounds.map_or_else(GreedyLotFiller::default, GreedyLotFiller::new),
            ),
        }
    }
}

/// Parameters Fixture
#[derive(Debug, Default, Deserialize)]
pub struct ParametersFixture {
    /// Progression (e.g., "10%" or "0.10")
    pub progression: Option<String>,

    /// Objective (e.g., "500.00 GBP")
    pub objective: Option<String>,

    /// Selected months; all months when missing
    pub months: Option<Vec<Month>>,

    /// Objective strategy
    pub strategy: Option<StrategyKind>,

    /// Lot rounding
    pub rounding: Option<Rounding>,

    /// Round budget for the greedy strategy
    pub max_rounds: Option<u32>,
}

impl ParametersFixture {
    /// Convert into plan parameters for a catalog priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or the objective is in
    /// another currency.
    pub fn to_parameters(
        &self,
        currency: &'static Currency,
    ) -> Result<PlanParameters<'static>, FixtureError> {
        let mut params = PlanParameters::default();

        if let Some(progression) = &self.progression {
            params.progression = parse_percentage(progression)?;
        }

        if let Some(objective) = &self.objective {
            params.objective = Some(parse_objective(objective, currency)?);
        }

        if let Some(months) = &self.months {
            params.months = MonthSet::from_months(months.iter().copied());
        }

        params.rounding = self.rounding.unwrap_or_default();
        params.strategy = self
            .strategy
            .unwrap_or_default()
            .strategy(self.max_rounds);

        Ok(params)
    }
}

/// Parse an objective amount and check it is in the catalog currency.
///
/// # Errors
///
/// Returns an error if the price is malformed or in another currency.
pub fn parse_objective(
    s: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, objective_currency) = parse_price(s)?;

    if objective_currency != currency {
        return Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            objective_currency.iso_alpha_code.to_string(),
        ));
    }

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(code)?;

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Look up a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Negative values are allowed (a "-20%" progression plans a decline).
///
/// # Errors
///
/// Returns an error if the string is not a decimal number.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();
    let invalid = || FixtureError::InvalidPercentage(s.to_string());

    let fraction = match trimmed.strip_suffix('%') {
        Some(points) => points
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?,
        None => trimmed.parse::<Decimal>().map_err(|_err| invalid())?,
    };

    Ok(Percentage::from(fraction))
}
