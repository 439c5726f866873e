//! Fifteen-year payback projection under three regimes.
//!
//! * `huidig`: net metering, exports offset imports one to one.
//! * `na2027`: no net metering, exports earn only the feed-in tariff.
//! * `dynamischOptimaal`: `na2027` plus price arbitrage on a dynamic contract.

use std::fmt;

use tracing::debug;

use super::arbitrage::{ArbitrageStats, arbitrage_stats};
use super::types::{
    BatteryInput, BatteryScenarios, HORIZON_YEARS, SavingsBreakdown, ScenarioResult,
    SelfConsumptionImpact,
};
use crate::contract::{ArbitrageThresholds, Contract};
use crate::error::{CalcError, Result, ensure_finite};
use crate::prices::PriceSeries;

/// Days per year with enough solar surplus to fill the battery once.
pub const SOLAR_CYCLE_DAYS: f64 = 250.0;

/// Regulatory/contract regime a scenario is computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    NetMetering,
    NoNetMetering,
    DynamicArbitrage,
}

impl Regime {
    pub fn name(self) -> &'static str {
        match self {
            Self::NetMetering => "huidig",
            Self::NoNetMetering => "na2027",
            Self::DynamicArbitrage => "dynamischOptimaal",
        }
    }
}

/// Solar energy the battery can move from export to self-consumption.
#[derive(Debug, Clone, Copy)]
struct SolarShift {
    /// kWh/year the claimed self-consumption gain would move, before any
    /// capacity limit.
    demand_kwh: f64,
}

impl SolarShift {
    fn new(input: &BatteryInput) -> Self {
        let production = input.solar_production_kwh;
        let without = production * input.self_consumption_without_pct / 100.0;
        let claimed = production
            * (input.self_consumption_with_pct - input.self_consumption_without_pct)
            / 100.0;
        let room = (input.annual_consumption_kwh - without).max(0.0);
        Self {
            demand_kwh: claimed.clamp(0.0, room),
        }
    }

    /// Shifted kWh for a new battery of `capacity_kwh`.
    fn shifted(&self, capacity_kwh: f64) -> f64 {
        self.demand_kwh.min(capacity_kwh * SOLAR_CYCLE_DAYS)
    }

    fn is_capacity_bound(&self, capacity_kwh: f64) -> bool {
        self.demand_kwh > capacity_kwh * SOLAR_CYCLE_DAYS
    }
}

/// Computes the three payback scenarios for `input`.
///
/// `prices` feeds the arbitrage estimate; without it the dynamic scenario
/// carries no arbitrage gain. A dynamic contract requires prices.
///
/// # Errors
///
/// Validation errors from [`BatteryInput::validate`],
/// [`CalcError::MissingData`] for a dynamic contract without prices and
/// [`CalcError::Calculation`] for non-finite results.
pub fn compute_scenarios(
    input: &BatteryInput,
    prices: Option<&PriceSeries>,
) -> Result<BatteryScenarios> {
    input.validate()?;
    let thresholds = match input.contract {
        Contract::Dynamic(tariff) => {
            if prices.is_none() {
                return Err(CalcError::missing("prices"));
            }
            tariff.arbitrage
        }
        Contract::Fixed(_) => ArbitrageThresholds::default(),
    };

    let shift = SolarShift::new(input);
    let battery = &input.battery;
    let shifted = shift.shifted(battery.capacity_kwh);
    let solar_cycles = shifted / battery.capacity_kwh;
    let stats = prices
        .map(|series| arbitrage_stats(series, &thresholds, battery, solar_cycles))
        .transpose()?;
    let arbitrage_profit = stats.map_or(0.0, |s| s.net_arbitrage_profit);

    let huidig = project(Regime::NetMetering, input, shifted, 0.0)?;
    let na2027 = project(Regime::NoNetMetering, input, shifted, 0.0)?;
    let dynamisch_optimaal = project(Regime::DynamicArbitrage, input, shifted, arbitrage_profit)?;

    let eigenverbruik_impact = input.has_solar().then(|| self_consumption_impact(input, &shift));
    let arbitrage_stats = match input.contract {
        Contract::Dynamic(_) => stats,
        Contract::Fixed(_) => None,
    };

    debug!(
        capacity_kwh = battery.capacity_kwh,
        huidig = ?huidig.payback_years,
        na2027 = ?na2027.payback_years,
        dynamisch = ?dynamisch_optimaal.payback_years,
        "battery scenarios computed"
    );
    Ok(BatteryScenarios {
        huidig,
        na2027,
        dynamisch_optimaal,
        eigenverbruik_impact,
        arbitrage_stats,
    })
}

/// Savings in operating year `year` (1-based).
///
/// Everything the battery delivers scales with `(1 - d)^year`.
fn annual_savings(
    regime: Regime,
    input: &BatteryInput,
    shifted: f64,
    arbitrage_profit: f64,
    year: u32,
) -> SavingsBreakdown {
    let battery = &input.battery;
    let health = battery.degradation_factor(year);
    let shifted = shifted * health;
    let delivered = shifted * battery.round_trip_efficiency;
    let import_value = delivered * input.import_price_per_kwh;
    let avoided_feed_in_cost = shifted * input.feed_in_cost_per_kwh;

    match regime {
        Regime::NetMetering => SavingsBreakdown::new(
            import_value,
            avoided_feed_in_cost,
            0.0,
            -shifted * input.import_price_per_kwh,
        ),
        Regime::NoNetMetering => SavingsBreakdown::new(
            import_value - shifted * input.feed_in_tariff_per_kwh,
            avoided_feed_in_cost,
            0.0,
            0.0,
        ),
        Regime::DynamicArbitrage => SavingsBreakdown::new(
            import_value - shifted * input.feed_in_tariff_per_kwh,
            avoided_feed_in_cost,
            arbitrage_profit * health,
            0.0,
        ),
    }
}

fn project(
    regime: Regime,
    input: &BatteryInput,
    shifted: f64,
    arbitrage_profit: f64,
) -> Result<ScenarioResult> {
    let mut cumulative = -input.battery.price_euro;
    let mut cash_flow = Vec::with_capacity(HORIZON_YEARS);
    cash_flow.push(ensure_finite("cumulative cash flow", cumulative)?);
    let first_year = annual_savings(regime, input, shifted, arbitrage_profit, 1);
    for year in 1..HORIZON_YEARS as u32 {
        cumulative += annual_savings(regime, input, shifted, arbitrage_profit, year).total;
        cash_flow.push(ensure_finite("cumulative cash flow", cumulative)?);
    }

    let payback_years = cash_flow
        .iter()
        .position(|v| *v >= 0.0)
        .map(|year| year as u32);
    Ok(ScenarioResult {
        name: regime.name().to_string(),
        savings_breakdown: first_year,
        payback_years,
        cumulative_cash_flow: cash_flow,
        is_viable: payback_years.is_some(),
        pays_back_within_warranty: payback_years
            .is_some_and(|y| y <= input.battery.warranty_years),
    })
}

fn self_consumption_impact(input: &BatteryInput, shift: &SolarShift) -> SelfConsumptionImpact {
    let production = input.solar_production_kwh;
    let capacity = input.battery.capacity_kwh;
    let without = production * input.self_consumption_without_pct / 100.0;
    let shifted = shift.shifted(capacity);
    SelfConsumptionImpact {
        self_consumed_without_kwh: without,
        self_consumed_with_kwh: without + shifted * input.battery.round_trip_efficiency,
        exported_without_kwh: production - without,
        exported_with_kwh: production - without - shifted,
        shifted_kwh: shifted,
        capacity_bound: shift.is_capacity_bound(capacity),
    }
}

impl fmt::Display for BatteryScenarios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Battery Scenarios ---")?;
        writeln!(
            f,
            "{:<20} {:>12} {:>10} {:>14}",
            "scenario", "year 1 EUR", "payback", "final EUR"
        )?;
        for scenario in self.all() {
            let payback = scenario
                .payback_years
                .map_or_else(|| "never".to_string(), |y| format!("{y} y"));
            writeln!(
                f,
                "{:<20} {:>12.2} {:>10} {:>14.2}",
                scenario.name,
                scenario.savings_breakdown.total,
                payback,
                scenario.final_cash_flow()
            )?;
        }
        if let Some(impact) = &self.eigenverbruik_impact {
            writeln!(
                f,
                "Self-consumption:      {:.0} -> {:.0} kWh ({:.0} kWh shifted{})",
                impact.self_consumed_without_kwh,
                impact.self_consumed_with_kwh,
                impact.shifted_kwh,
                if impact.capacity_bound { ", capacity bound" } else { "" }
            )?;
        }
        if let Some(stats) = &self.arbitrage_stats {
            write_arbitrage(f, stats)?;
        }
        Ok(())
    }
}

fn write_arbitrage(f: &mut fmt::Formatter<'_>, stats: &ArbitrageStats) -> fmt::Result {
    writeln!(
        f,
        "Arbitrage:             {:.4} -> {:.4} EUR/kWh, {:.0} cycles/year",
        stats.p20_low, stats.p20_high, stats.estimated_cycles_per_year
    )?;
    writeln!(
        f,
        "Arbitrage profit:      EUR {:.2}/year ({} negative price hours)",
        stats.net_arbitrage_profit, stats.negative_price_hours
    )
}
