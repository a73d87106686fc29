//! Forecast
//!
//! Forecast is a purchasing plan engine: it spreads yearly order quantities over
//! months following each product's seasonality, in whole supplier lots, and
//! scales or fills those quantities to match a monetary objective.

pub mod allocation;
pub mod catalog;
pub mod fixtures;
pub mod history;
pub mod lots;
pub mod months;
pub mod objective;
pub mod plan;
pub mod prelude;
pub mod products;
pub mod seasonality;
pub mod utils;
