//! Plan Example
//!
//! Computes the progression and objective scenarios for a catalog fixture.
//!
//! Use `-f` to load a catalog fixture by name
//! Use `-p` to override the progression (e.g. `-p 15%`)
//! Use `-o` to override the objective (e.g. `-o "1200.00 GBP"`)
//! Use `-s` to pick the objective strategy (`grid`, `bisection` or `greedy`)
//!
//! Set `RUST_LOG=forecast=debug` to see allocation residuals and search fallbacks.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use forecast::{
    catalog::Catalog,
    fixtures::Fixture,
    plan::{ObjectiveOutcome, PurchasePlan, ScenarioComparison},
    utils::PlanArgs,
};

/// Plan Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = PlanArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let catalog = fixture.catalog()?;
    let params = args.parameters(&fixture)?;

    let start = Instant::now();
    let comparison = ScenarioComparison::compute(catalog, &params)?;
    let elapsed = start.elapsed().as_secs_f32();

    println!("Progression (x{})", params.progression_factor());
    print_plan(catalog, &comparison.progression);

    if let Some(objective) = &comparison.objective {
        println!("\nObjective ({})", objective.objective());

        match objective.outcome() {
            ObjectiveOutcome::Coefficient(result) => {
                println!("  coefficient: {}", result.coefficient);
            }
            ObjectiveOutcome::Greedy(fill) => {
                println!("  lots granted: {}", fill.rounds());
            }
        }

        print_plan(catalog, objective.plan());

        println!("  shortfall: {}", objective.shortfall()?);
    }

    if let Some(difference) = comparison.cost_difference()? {
        println!("\nObjective - progression: {difference}");
    }

    println!("\nSolution: {elapsed}s");

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Example code")]
fn print_plan(catalog: &Catalog<'_>, plan: &PurchasePlan<'_>) {
    for line in plan.lines() {
        let reference = catalog
            .get(line.key)
            .map_or("?", |product| product.product_ref.as_str());

        let months: Vec<String> = line
            .allocation
            .by_month(plan.months())
            .map(|(month, quantity)| format!("{month:?}={quantity}"))
            .collect();

        println!(
            "  {reference:<10} {:>6} units  {:>10}  [{}]",
            line.quantity(),
            line.cost.to_string(),
            months.join(" ")
        );
    }

    println!(
        "  total: {} units, {} (history: {} units, {})",
        plan.total_quantity(),
        plan.total_cost(),
        plan.history_quantity(),
        plan.history_cost()
    );
}
