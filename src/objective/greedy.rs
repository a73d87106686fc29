//! Greedy lot filling
//!
//! Grants one lot per round to the cheapest product that still fits under the
//! objective. A heuristic: deterministic and bounded, not an exact subset-sum
//! solver.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::products::ProductKey;

use super::LotDemand;

/// Cheapest-first, one-lot-per-round filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyLotFiller {
    max_rounds: u32,
}

impl GreedyLotFiller {
    /// Rounds allowed by default.
    pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

    /// Create a filler that grants at most `max_rounds` lots.
    pub const fn new(max_rounds: u32) -> Self {
        Self { max_rounds }
    }

    /// Maximum number of rounds.
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Grant lots until the objective is reached, nothing else fits, or the
    /// round budget runs out.
    ///
    /// Products with no positive cost per lot never receive lots. Ties on cost
    /// keep the order of `demands`.
    pub fn fill(&self, demands: &[LotDemand], objective_minor: i64) -> GreedyFill {
        let mut order: SmallVec<[(ProductKey, i64); 16]> = demands
            .iter()
            .map(|demand| (demand.key, demand.cost_per_lot()))
            .filter(|(_, cost)| *cost > 0)
            .collect();

        order.sort_by_key(|(_, cost)| *cost);

        let mut packs: FxHashMap<ProductKey, u64> =
            demands.iter().map(|demand| (demand.key, 0)).collect();
        let mut total_minor: i64 = 0;
        let mut rounds = 0;

        while rounds < self.max_rounds && total_minor < objective_minor {
            let Some((key, cost)) = order
                .iter()
                .find(|(_, cost)| total_minor.saturating_add(*cost) <= objective_minor)
            else {
                break;
            };

            *packs.entry(*key).or_default() += 1;
            total_minor = total_minor.saturating_add(*cost);
            rounds += 1;
        }

        GreedyFill {
            packs,
            total_minor,
            rounds,
        }
    }
}

impl Default for GreedyLotFiller {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ROUNDS)
    }
}

/// Lots granted by a [`GreedyLotFiller`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreedyFill {
    packs: FxHashMap<ProductKey, u64>,
    total_minor: i64,
    rounds: u32,
}

impl GreedyFill {
    /// Lots granted to a product.
    pub fn packs(&self, key: ProductKey) -> u64 {
        self.packs.get(&key).copied().unwrap_or_default()
    }

    /// Units granted to a demand's product (lots times lot size).
    pub fn quantity(&self, demand: &LotDemand) -> u64 {
        self.packs(demand.key).saturating_mul(demand.lot_size.get())
    }

    /// Total cost in minor units of every granted lot.
    pub fn total_minor(&self) -> i64 {
        self.total_minor
    }

    /// Number of rounds that granted a lot.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}
