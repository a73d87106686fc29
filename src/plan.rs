//! Purchase Plans
//!
//! Runs the two purchasing scenarios over a catalog:
//!
//! - **Progression**: repeat last period's volume scaled by a percentage.
//! - **Objective**: scale or fill quantities so total cost approaches a budget.
//!
//! Both produce a [`PurchasePlan`] of per-product monthly lot quantities.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    allocation::{Allocation, MonthlyAllocator, Rounding},
    catalog::Catalog,
    months::MonthSet,
    objective::{
        CoefficientSearch, LotDemand, ObjectiveSearchResult,
        bisection::BisectionSearch,
        greedy::{GreedyFill, GreedyLotFiller},
        grid::CoefficientGrid,
    },
    products::{ProductKey, cost_minor},
    seasonality::SeasonalityVector,
};

/// Errors that can occur while planning.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    /// The objective is expressed in another currency than the catalog.
    #[error("objective currency {objective} does not match catalog currency {catalog}")]
    CurrencyMismatch {
        /// Objective currency code
        objective: &'static str,
        /// Catalog currency code
        catalog: &'static str,
    },
}

/// How the objective scenario turns a budget into per-product quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveStrategy {
    /// Scan a fixed coefficient grid.
    Grid(CoefficientGrid),

    /// Bisect the coefficient interval.
    Bisection(BisectionSearch),

    /// Grant lots cheapest-first, ignoring history.
    Greedy(GreedyLotFiller),
}

impl Default for ObjectiveStrategy {
    fn default() -> Self {
        ObjectiveStrategy::Grid(CoefficientGrid::default())
    }
}

/// Scenario parameters supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct PlanParameters<'a> {
    /// Growth applied to last period's volume (a fraction: 0.10 is +10%).
    pub progression: Percentage,

    /// Budget for the objective scenario. Skipped when missing or not positive.
    pub objective: Option<Money<'a, Currency>>,

    /// Months included in the computation.
    pub months: MonthSet,

    /// Lot rounding before reconciliation.
    pub rounding: Rounding,

    /// Objective matching strategy.
    pub strategy: ObjectiveStrategy,
}

impl Default for PlanParameters<'_> {
    fn default() -> Self {
        Self {
            progression: Percentage::from(0.0),
            objective: None,
            months: MonthSet::all(),
            rounding: Rounding::default(),
            strategy: ObjectiveStrategy::default(),
        }
    }
}

impl PlanParameters<'_> {
    /// Multiplier applied to history by the progression scenario, never negative.
    ///
    /// Kept to six decimal places so float-built percentages carry no binary noise.
    pub fn progression_factor(&self) -> Decimal {
        (Decimal::ONE + self.progression * Decimal::ONE)
            .round_dp(6)
            .max(Decimal::ZERO)
    }
}

/// Planned purchases for one product.
#[derive(Debug, Clone)]
pub struct PlanLine<'a> {
    /// Product the line belongs to
    pub key: ProductKey,

    /// Monthly quantities
    pub allocation: Allocation,

    /// Cost of the allocated quantity
    pub cost: Money<'a, Currency>,
}

impl PlanLine<'_> {
    /// Units ordered over all selected months.
    pub fn quantity(&self) -> u64 {
        self.allocation.total()
    }
}

/// Per-product monthly quantities with comparison totals.
#[derive(Debug, Clone)]
pub struct PurchasePlan<'a> {
    lines: Vec<PlanLine<'a>>,
    months: MonthSet,
    total_quantity: u64,
    total_cost: Money<'a, Currency>,
    history_quantity: Decimal,
    history_cost: Money<'a, Currency>,
}

impl<'a> PurchasePlan<'a> {
    /// Lines in catalog order.
    pub fn lines(&self) -> &[PlanLine<'a>] {
        &self.lines
    }

    /// Lookup the line for a product.
    pub fn line(&self, key: ProductKey) -> Option<&PlanLine<'a>> {
        self.lines.iter().find(|line| line.key == key)
    }

    /// Months the quantities are spread over.
    pub fn months(&self) -> MonthSet {
        self.months
    }

    /// Units ordered across every product.
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Cost of every ordered unit.
    pub fn total_cost(&self) -> Money<'a, Currency> {
        self.total_cost
    }

    /// Units sold over the selected months last period.
    pub fn history_quantity(&self) -> Decimal {
        self.history_quantity
    }

    /// Cost of re-buying last period's volume at current unit costs.
    pub fn history_cost(&self) -> Money<'a, Currency> {
        self.history_cost
    }

    /// Whether every line's months add up to its target.
    pub fn is_exact(&self) -> bool {
        self.lines.iter().all(|line| line.allocation.is_exact())
    }
}

/// Strategy-specific detail behind an objective plan.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveOutcome {
    /// A shared coefficient was searched for.
    Coefficient(ObjectiveSearchResult),

    /// Lots were granted greedily.
    Greedy(GreedyFill),
}

/// Objective scenario result.
#[derive(Debug, Clone)]
pub struct ObjectivePlan<'a> {
    plan: PurchasePlan<'a>,
    outcome: ObjectiveOutcome,
    objective: Money<'a, Currency>,
}

impl<'a> ObjectivePlan<'a> {
    /// The purchase plan.
    pub fn plan(&self) -> &PurchasePlan<'a> {
        &self.plan
    }

    /// How the per-product targets were found.
    pub fn outcome(&self) -> &ObjectiveOutcome {
        &self.outcome
    }

    /// The requested budget.
    pub fn objective(&self) -> Money<'a, Currency> {
        self.objective
    }

    /// Budget left unspent; negative when the plan exceeds the objective.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn shortfall(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.objective.sub(self.plan.total_cost)
    }

    /// Whether the plan's cost stays within the objective.
    pub fn within_objective(&self) -> bool {
        self.plan.total_cost.to_minor_units() <= self.objective.to_minor_units()
    }
}

/// Both scenarios computed from one set of parameters.
#[derive(Debug, Clone)]
pub struct ScenarioComparison<'a> {
    /// Percentage progression scenario
    pub progression: PurchasePlan<'a>,

    /// Objective scenario, when an objective was set
    pub objective: Option<ObjectivePlan<'a>>,
}

impl<'a> ScenarioComparison<'a> {
    /// Compute both scenarios.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] if the objective scenario cannot run.
    pub fn compute(
        catalog: &Catalog<'_>,
        params: &PlanParameters<'a>,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            progression: progression_plan(catalog, params),
            objective: objective_plan(catalog, params)?,
        })
    }

    /// Objective cost minus progression cost, when the objective scenario ran.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn cost_difference(&self) -> Result<Option<Money<'a, Currency>>, MoneyError> {
        self.objective
            .as_ref()
            .map(|objective| objective.plan.total_cost.sub(self.progression.total_cost))
            .transpose()
    }
}

/// Plan last period's volume scaled by the progression percentage.
///
/// Each product's target is its history over the selected months times
/// `1 + progression`, rounded up to a whole lot, then spread by seasonality.
#[instrument(skip_all, fields(products = catalog.len(), months = params.months.len()))]
pub fn progression_plan<'a>(catalog: &Catalog<'_>, params: &PlanParameters<'a>) -> PurchasePlan<'a> {
    let factor = params.progression_factor();

    let plan = build_plan(catalog, params, |demand| demand.quantity_at(factor));

    debug!(
        total_quantity = plan.total_quantity,
        total_cost = %plan.total_cost,
        "progression plan computed"
    );

    plan
}

/// Plan purchases whose total cost approaches the objective from below.
///
/// Returns `Ok(None)` when no positive objective is set.
///
/// # Errors
///
/// Returns [`PlanError::CurrencyMismatch`] if the objective is not in the
/// catalog currency.
#[instrument(skip_all, fields(products = catalog.len(), months = params.months.len()))]
pub fn objective_plan<'a>(
    catalog: &Catalog<'_>,
    params: &PlanParameters<'a>,
) -> Result<Option<ObjectivePlan<'a>>, PlanError> {
    let Some(objective) = params
        .objective
        .filter(|objective| objective.to_minor_units() > 0)
    else {
        debug!("no positive objective set, skipping objective scenario");

        return Ok(None);
    };

    if objective.currency() != catalog.currency() {
        return Err(PlanError::CurrencyMismatch {
            objective: objective.currency().iso_alpha_code,
            catalog: catalog.currency().iso_alpha_code,
        });
    }

    let objective_minor = objective.to_minor_units();

    // Nothing can be ordered without months, so no strategy may spend.
    let demands = if params.months.is_empty() {
        debug!("no months selected, objective strategies see no products");

        Vec::new()
    } else {
        demands(catalog, params.months)
    };

    let (targets, outcome): (FxHashMap<ProductKey, u64>, ObjectiveOutcome) = match params.strategy
    {
        ObjectiveStrategy::Grid(grid) => {
            let result = grid.search(&demands, objective_minor);
            (result.quantities.clone(), ObjectiveOutcome::Coefficient(result))
        }
        ObjectiveStrategy::Bisection(bisection) => {
            let result = bisection.search(&demands, objective_minor);
            (result.quantities.clone(), ObjectiveOutcome::Coefficient(result))
        }
        ObjectiveStrategy::Greedy(filler) => {
            let fill = filler.fill(&demands, objective_minor);
            let targets = demands
                .iter()
                .map(|demand| (demand.key, fill.quantity(demand)))
                .collect();
            (targets, ObjectiveOutcome::Greedy(fill))
        }
    };

    let plan = build_plan(catalog, params, |demand| {
        targets.get(&demand.key).copied().unwrap_or_default()
    });

    debug!(
        objective = %objective,
        total_cost = %plan.total_cost,
        "objective plan computed"
    );

    Ok(Some(ObjectivePlan {
        plan,
        outcome,
        objective,
    }))
}

/// Search inputs for every catalog product, in catalog order.
pub fn demands(catalog: &Catalog<'_>, months: MonthSet) -> Vec<LotDemand> {
    catalog
        .iter()
        .map(|(key, product)| LotDemand::from_product(key, product, months))
        .collect()
}

fn build_plan<'a>(
    catalog: &Catalog<'_>,
    params: &PlanParameters<'a>,
    target: impl Fn(&LotDemand) -> u64,
) -> PurchasePlan<'a> {
    let allocator = MonthlyAllocator::new(params.rounding);

    let mut lines = Vec::with_capacity(catalog.len());
    let mut total_quantity: u64 = 0;
    let mut total_cost: i64 = 0;
    let mut history_quantity = Decimal::ZERO;
    let mut history_cost: i64 = 0;

    for (key, product) in catalog.iter() {
        let demand = LotDemand::from_product(key, product, params.months);
        let weights = SeasonalityVector::for_product(product, params.months);
        let requested = i64::try_from(target(&demand)).unwrap_or(i64::MAX);

        let allocation = allocator.allocate(requested, weights.weights(), product.lot_size);
        let cost = cost_minor(demand.unit_cost_minor, allocation.total());

        total_quantity = total_quantity.saturating_add(allocation.total());
        total_cost = total_cost.saturating_add(cost);
        history_quantity = history_quantity.saturating_add(demand.base_quantity);
        history_cost = history_cost.saturating_add(demand.base_cost_minor());

        lines.push(PlanLine {
            key,
            allocation,
            cost: catalog.money(cost),
        });
    }

    PurchasePlan {
        lines,
        months: params.months,
        total_quantity,
        total_cost: catalog.money(total_cost),
        history_quantity,
        history_cost: catalog.money(history_cost),
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        history::MonthlyHistory,
        lots::LotSize,
        months::Month,
        products::ProductLine,
    };

    use super::*;

    fn catalog() -> Result<Catalog<'static>, crate::catalog::CatalogError> {
        Catalog::with_products(
            [
                ProductLine::new(
                    "FLAT",
                    MonthlyHistory::new([10.0; 12]),
                    Money::from_minor(200, GBP),
                    LotSize::new(10),
                ),
                ProductLine::new(
                    "SUMMER",
                    MonthlyHistory::new([
                        0.0, 0.0, 0.0, 0.0, 10.0, 20.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0,
                    ]),
                    Money::from_minor(300, GBP),
                    LotSize::new(5),
                ),
            ],
            GBP,
        )
    }

    #[test]
    fn progression_factor_is_clamped_at_zero() {
        let mut params = PlanParameters::default();

        assert_eq!(params.progression_factor(), Decimal::ONE);

        params.progression = Percentage::from(-1.5);
        assert_eq!(params.progression_factor(), Decimal::ZERO);
    }

    #[test]
    fn progression_plan_scales_history() -> TestResult {
        let catalog = catalog()?;
        let params = PlanParameters {
            progression: Percentage::from(Decimal::new(10, 2)),
            ..PlanParameters::default()
        };

        let plan = progression_plan(&catalog, &params);

        // 120 * 1.1 = 132 -> 140 in lots of 10; 50 * 1.1 = 55 in lots of 5.
        let quantities: Vec<u64> = plan.lines().iter().map(PlanLine::quantity).collect();
        assert_eq!(quantities, vec![140, 55]);
        assert_eq!(plan.total_quantity(), 195);
        assert_eq!(plan.total_cost(), Money::from_minor(140 * 200 + 55 * 300, GBP));
        assert_eq!(plan.history_quantity(), Decimal::from(170));
        assert_eq!(plan.history_cost(), Money::from_minor(120 * 200 + 50 * 300, GBP));
        assert!(plan.is_exact());

        Ok(())
    }

    #[test]
    fn progression_plan_follows_seasonality() -> TestResult {
        let catalog = catalog()?;
        let plan = progression_plan(&catalog, &PlanParameters::default());

        let summer = plan
            .lines()
            .get(1)
            .map(|line| line.allocation.by_month(plan.months()).collect::<Vec<_>>())
            .unwrap_or_default();

        let ordered: Vec<(Month, u64)> = summer.into_iter().filter(|(_, qty)| *qty > 0).collect();

        assert_eq!(
            ordered,
            vec![(Month::May, 10), (Month::June, 20), (Month::July, 20)]
        );

        Ok(())
    }

    #[test]
    fn full_decline_orders_nothing() -> TestResult {
        let catalog = catalog()?;
        let params = PlanParameters {
            progression: Percentage::from(-1.0),
            ..PlanParameters::default()
        };

        let plan = progression_plan(&catalog, &params);

        assert_eq!(plan.total_quantity(), 0);
        assert_eq!(plan.total_cost(), Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn objective_plan_is_skipped_without_positive_objective() -> TestResult {
        let catalog = catalog()?;

        let none = PlanParameters::default();
        let zero = PlanParameters {
            objective: Some(Money::from_minor(0, GBP)),
            ..PlanParameters::default()
        };

        assert!(objective_plan(&catalog, &none)?.is_none());
        assert!(objective_plan(&catalog, &zero)?.is_none());

        Ok(())
    }

    #[test]
    fn objective_plan_rejects_other_currencies() -> TestResult {
        let catalog = catalog()?;
        let params = PlanParameters {
            objective: Some(Money::from_minor(10_000, USD)),
            ..PlanParameters::default()
        };

        assert_eq!(
            objective_plan(&catalog, &params).err(),
            Some(PlanError::CurrencyMismatch {
                objective: "USD",
                catalog: "GBP",
            })
        );

        Ok(())
    }

    #[test]
    fn objective_plan_stays_within_budget() -> TestResult {
        let catalog = catalog()?;
        let objective = Money::from_minor(30_000, GBP);

        for strategy in [
            ObjectiveStrategy::Grid(CoefficientGrid::default()),
            ObjectiveStrategy::Bisection(BisectionSearch::default()),
            ObjectiveStrategy::Greedy(GreedyLotFiller::default()),
        ] {
            let params = PlanParameters {
                objective: Some(objective),
                strategy,
                ..PlanParameters::default()
            };

            let plan = objective_plan(&catalog, &params)?.ok_or("objective plan skipped")?;

            assert!(plan.within_objective(), "{strategy:?} exceeded the objective");
            assert!(plan.shortfall()?.to_minor_units() >= 0);
            assert!(plan.plan().is_exact(), "{strategy:?} left a residual");
        }

        Ok(())
    }

    #[test]
    fn grid_objective_plan_reports_the_coefficient() -> TestResult {
        let catalog = catalog()?;
        let params = PlanParameters {
            objective: Some(Money::from_minor(30_000, GBP)),
            ..PlanParameters::default()
        };

        let plan = objective_plan(&catalog, &params)?.ok_or("objective plan skipped")?;

        let ObjectiveOutcome::Coefficient(result) = plan.outcome() else {
            return Err("expected a coefficient outcome".into());
        };

        assert!(result.within_objective);
        assert_eq!(
            plan.plan().total_cost().to_minor_units(),
            result.achieved_minor
        );

        Ok(())
    }

    #[test]
    fn objective_plan_over_no_months_spends_nothing() -> TestResult {
        let catalog = catalog()?;

        for strategy in [
            ObjectiveStrategy::Grid(CoefficientGrid::default()),
            ObjectiveStrategy::Bisection(BisectionSearch::default()),
            ObjectiveStrategy::Greedy(GreedyLotFiller::default()),
        ] {
            let params = PlanParameters {
                objective: Some(Money::from_minor(1_000, GBP)),
                months: MonthSet::empty(),
                strategy,
                ..PlanParameters::default()
            };

            let plan = objective_plan(&catalog, &params)?.ok_or("objective plan skipped")?;

            let spent = match plan.outcome() {
                ObjectiveOutcome::Coefficient(result) => result.achieved_minor,
                ObjectiveOutcome::Greedy(fill) => fill.total_minor(),
            };

            assert_eq!(spent, 0, "{strategy:?} spent without months");
            assert_eq!(plan.plan().total_quantity(), 0);
            assert_eq!(plan.plan().total_cost(), Money::from_minor(0, GBP));
            assert_eq!(plan.shortfall()?, Money::from_minor(1_000, GBP));
            assert!(plan.plan().is_exact(), "{strategy:?} left a residual");
        }

        Ok(())
    }

    #[test]
    fn comparison_reports_cost_difference() -> TestResult {
        let catalog = catalog()?;
        let params = PlanParameters {
            objective: Some(Money::from_minor(30_000, GBP)),
            ..PlanParameters::default()
        };

        let comparison = ScenarioComparison::compute(&catalog, &params)?;

        let objective_cost = comparison
            .objective
            .as_ref()
            .map(|plan| plan.plan().total_cost().to_minor_units())
            .ok_or("objective plan skipped")?;
        let progression_cost = comparison.progression.total_cost().to_minor_units();

        assert_eq!(
            comparison.cost_difference()?,
            Some(Money::from_minor(objective_cost - progression_cost, GBP))
        );

        Ok(())
    }
}
