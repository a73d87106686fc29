//! Utils

use clap::Parser;

use crate::{
    fixtures::{
        Fixture, FixtureError,
        catalogs::{StrategyKind, parse_objective, parse_percentage},
    },
    plan::PlanParameters,
};

/// Arguments for the planning demos
#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// Catalog fixture to plan
    #[clap(short, long, default_value = "sample")]
    pub fixture: String,

    /// Progression applied to last period's volume (e.g., "10%")
    #[clap(short, long, allow_hyphen_values = true)]
    pub progression: Option<String>,

    /// Budget for the objective scenario (e.g., "1500.00 GBP")
    #[clap(short, long)]
    pub objective: Option<String>,

    /// Objective matching strategy
    #[clap(short, long, value_enum)]
    pub strategy: Option<StrategyKind>,
}

impl PlanArgs {
    /// The fixture's parameters with any command line overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded or an override cannot be parsed.
    pub fn parameters(&self, fixture: &Fixture) -> Result<PlanParameters<'static>, FixtureError> {
        let currency = fixture.catalog()?.currency();
        let mut params = *fixture.parameters();

        if let Some(progression) = &self.progression {
            params.progression = parse_percentage(progression)?;
        }

        if let Some(objective) = &self.objective {
            params.objective = Some(parse_objective(objective, currency)?);
        }

        if let Some(strategy) = self.strategy {
            params.strategy = strategy.strategy(None);
        }

        Ok(params)
    }
}
