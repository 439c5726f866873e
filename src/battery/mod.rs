//! Home battery payback scenarios.

pub mod arbitrage;
pub mod scenarios;
pub mod types;

pub use arbitrage::{ArbitrageStats, arbitrage_stats};
pub use scenarios::{Regime, SOLAR_CYCLE_DAYS, compute_scenarios};
pub use types::{
    BatteryInput, BatteryProfile, BatteryScenarios, CAPACITY_RANGE_KWH, HORIZON_YEARS,
    SavingsBreakdown, ScenarioResult, SelfConsumptionImpact,
};
