//! Annual cost estimation over an hourly price series.
//!
//! [`compute_annual_cost`] is the entry point: it validates its inputs,
//! aligns the load with the series and dispatches to the deterministic sum
//! or to the block-bootstrap Monte Carlo run.

pub mod compare;
pub mod deterministic;
pub mod monte_carlo;

use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use compare::{ContractComparison, compare_contracts};
pub use deterministic::{DeterministicCost, deterministic_cost};
pub use monte_carlo::{MonteCarloOptions, RiskDistribution, block_bootstrap};

use crate::error::{CalcError, NO_VALID_PRICE_DATA, Result};
use crate::prices::PriceSeries;
use crate::profile::{ConsumptionProfile, HouseholdProfile};

/// Consumption per priced hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Load {
    /// Same kWh in every hour.
    Flat(f64),
    /// One kWh value per price point, in timestamp order.
    Hourly(Vec<f64>),
}

impl Load {
    /// Expands the load to exactly `hours` values.
    ///
    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] for negative or non-finite values, or an
    /// hourly vector whose length differs from `hours`.
    pub fn resolve(&self, hours: usize) -> Result<Vec<f64>> {
        match self {
            Self::Flat(kwh) => {
                check_kwh(*kwh)?;
                Ok(vec![*kwh; hours])
            }
            Self::Hourly(values) => {
                if values.len() != hours {
                    return Err(CalcError::invalid(
                        "hourly_load",
                        format!("expected {hours} values, got {}", values.len()),
                    ));
                }
                values.iter().try_for_each(|v| check_kwh(*v))?;
                Ok(values.clone())
            }
        }
    }

    /// Hourly load of `household` aligned with `series`.
    ///
    /// The profile is normalized for the calendar year of the first price
    /// point. An empty series yields an empty load.
    ///
    /// # Errors
    ///
    /// Errors from [`HouseholdProfile::energy_mix`] and
    /// [`ConsumptionProfile::build`].
    pub fn from_household(household: &HouseholdProfile, series: &PriceSeries) -> Result<Self> {
        let mix = household.energy_mix()?;
        let Some(first) = series.first_timestamp() else {
            return Ok(Self::Hourly(Vec::new()));
        };
        let profile = ConsumptionProfile::build(&mix, household.annual_kwh, first.year())?;
        Ok(Self::Hourly(profile.hourly_load_for(series)))
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Flat(kwh) => check_kwh(*kwh),
            Self::Hourly(values) => values.iter().try_for_each(|v| check_kwh(*v)),
        }
    }
}

fn check_kwh(kwh: f64) -> Result<()> {
    if kwh.is_finite() && kwh >= 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid("load_kwh", "must be a non-negative number"))
    }
}

/// Deterministic sum or Monte Carlo distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CostMode {
    #[default]
    Deterministic,
    MonteCarlo(MonteCarloOptions),
}

/// Result of [`compute_annual_cost`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum AnnualCost {
    Deterministic(DeterministicCost),
    Risk(RiskDistribution),
}

impl AnnualCost {
    /// Point estimate: the total for deterministic runs, the median otherwise.
    pub fn central_estimate(&self) -> f64 {
        match self {
            Self::Deterministic(cost) => cost.total_cost,
            Self::Risk(dist) => dist.median,
        }
    }
}

impl fmt::Display for AnnualCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Annual Cost ---")?;
        match self {
            Self::Deterministic(cost) => write!(f, "{cost}"),
            Self::Risk(dist) => write!(f, "{dist}"),
        }
    }
}

/// Computes the annual cost of `load` priced against `series`.
///
/// # Arguments
///
/// * `series` - Hourly prices (€/kWh) in timestamp order
/// * `load` - Consumption per priced hour
/// * `fixed_costs` - Fixed yearly costs added to every total (may be negative
///   when tax refunds exceed standing charges)
/// * `mode` - Deterministic or Monte Carlo
///
/// # Errors
///
/// Inputs are validated before anything is computed. An empty series is a
/// [`CalcError::Calculation`] carrying [`NO_VALID_PRICE_DATA`].
pub fn compute_annual_cost(
    series: &PriceSeries,
    load: &Load,
    fixed_costs: f64,
    mode: CostMode,
) -> Result<AnnualCost> {
    if !fixed_costs.is_finite() {
        return Err(CalcError::invalid("fixed_costs", "must be a number"));
    }
    load.validate()?;
    if let CostMode::MonteCarlo(options) = &mode {
        options.validate()?;
    }
    if series.is_empty() {
        return Err(CalcError::Calculation(NO_VALID_PRICE_DATA.to_string()));
    }

    let prices = series.prices();
    let hourly_load = load.resolve(prices.len())?;
    debug!(hours = prices.len(), fixed_costs, ?mode, "computing annual cost");

    match mode {
        CostMode::Deterministic => {
            deterministic_cost(&prices, &hourly_load, fixed_costs).map(AnnualCost::Deterministic)
        }
        CostMode::MonteCarlo(options) => {
            let costs = deterministic::hourly_costs(&prices, &hourly_load)?;
            block_bootstrap(&costs, fixed_costs, &options).map(AnnualCost::Risk)
        }
    }
}

/// Parses and merges `sources`, then calls [`compute_annual_cost`].
///
/// Sources without any valid row contribute nothing, so passing only empty
/// texts ends in the empty-series [`CalcError::Calculation`].
///
/// # Errors
///
/// Parse errors from [`PriceSeries::parse_many`] and everything
/// [`compute_annual_cost`] returns.
pub fn annual_cost_from_csv(
    sources: &[&str],
    load: &Load,
    fixed_costs: f64,
    mode: CostMode,
) -> Result<AnnualCost> {
    let parsed = PriceSeries::parse_many(sources)?;
    compute_annual_cost(&parsed.series, load, fixed_costs, mode)
}
