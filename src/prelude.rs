//! Forecast prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{Allocation, MonthlyAllocator, Rounding},
    catalog::{Catalog, CatalogError},
    fixtures::{Fixture, FixtureError, catalogs::StrategyKind},
    history::MonthlyHistory,
    lots::LotSize,
    months::{Month, MonthSet},
    objective::{
        CoefficientSearch, LotDemand, ObjectiveError, ObjectiveSearchResult,
        bisection::BisectionSearch,
        greedy::{GreedyFill, GreedyLotFiller},
        grid::CoefficientGrid,
    },
    plan::{
        ObjectiveOutcome, ObjectivePlan, ObjectiveStrategy, PlanError, PlanLine, PlanParameters,
        PurchasePlan, ScenarioComparison, objective_plan, progression_plan,
    },
    products::{ProductKey, ProductLine},
    seasonality::SeasonalityVector,
};
