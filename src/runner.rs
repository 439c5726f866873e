//! End-to-end evaluation of one configured household.

use std::fmt;

use chrono::Datelike;
use tracing::{info, warn};

use crate::battery::{BatteryScenarios, compute_scenarios};
use crate::config::RunConfig;
use crate::contract::{Contract, ContractKind};
use crate::cost::{AnnualCost, ContractComparison, Load, compare_contracts, compute_annual_cost};
use crate::error::{CalcError, NO_VALID_PRICE_DATA, Result};
use crate::prices::{GroupedPriceStats, PriceSeries, summarize};
use crate::profile::{ConsumptionProfile, EnergyMix};

/// Everything computed for one run, in report order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub hours: usize,
    pub skipped_rows: usize,
    pub price_stats: GroupedPriceStats,
    pub mix: EnergyMix,
    pub profile: ConsumptionProfile,
    pub contract: ContractKind,
    /// Annual cost under the configured contract.
    pub annual_cost: AnnualCost,
    pub comparison: ContractComparison,
    /// Present when the battery section is enabled.
    pub battery: Option<BatteryScenarios>,
}

/// Prices the configured household against the merged `sources`.
///
/// # Arguments
///
/// * `config` - Validated run configuration
/// * `sources` - Price CSV texts, later sources win on duplicate hours
///
/// # Errors
///
/// The first [`CalcError`] raised by any stage. An input without valid price
/// rows ends in [`CalcError::Calculation`] with [`NO_VALID_PRICE_DATA`].
pub fn run(config: &RunConfig, sources: &[&str]) -> Result<RunReport> {
    let parsed = PriceSeries::parse_many(sources)?;
    if parsed.skipped_rows > 0 {
        warn!(skipped = parsed.skipped_rows, "ignored malformed price rows");
    }
    let series = parsed.series;
    let Some(first) = series.first_timestamp() else {
        return Err(CalcError::Calculation(NO_VALID_PRICE_DATA.to_string()));
    };
    info!(hours = series.len(), first = %first, "price series loaded");

    let household = config.household();
    let mix = household.energy_mix()?;
    let profile = ConsumptionProfile::build(&mix, household.annual_kwh, first.year())?;
    let load = Load::Hourly(profile.hourly_load_for(&series));

    let contract = config.contract();
    contract.validate()?;
    let contract_prices = match contract {
        Contract::Fixed(t) => series.map_prices(|_| t.price_per_kwh),
        Contract::Dynamic(t) => series.map_prices(|p| p + t.markup_per_kwh),
    };
    let fixed_costs = config.tariffs.fixed_costs_per_year;
    let annual_cost = compute_annual_cost(&contract_prices, &load, fixed_costs, config.cost_mode())?;

    let comparison = compare_contracts(
        &series,
        &load,
        &config.fixed_tariff(),
        &config.dynamic_tariff(),
        fixed_costs,
    )?;

    let battery = config
        .battery_input(config.import_price_per_kwh(&series))
        .map(|input| compute_scenarios(&input, Some(&series)))
        .transpose()?;

    Ok(RunReport {
        hours: series.len(),
        skipped_rows: parsed.skipped_rows,
        price_stats: summarize(&series),
        mix,
        profile,
        contract: contract.kind(),
        annual_cost,
        comparison,
        battery,
    })
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Prices: {} hours ({} rows skipped)",
            self.hours, self.skipped_rows
        )?;
        writeln!(f, "{}", self.price_stats)?;
        writeln!(
            f,
            "Energy mix ({}): base {:.0} kWh, heating {:.0} kWh",
            self.mix.method, self.mix.base_kwh, self.mix.heating_kwh
        )?;
        writeln!(f, "Contract: {}", self.contract)?;
        writeln!(f, "\n{}", self.annual_cost)?;
        writeln!(f, "\n{}", self.comparison)?;
        if let Some(battery) = &self.battery {
            write!(f, "\n{battery}")?;
        }
        Ok(())
    }
}
