//! Single-valued annual cost: `sum(load * price) + fixed costs`.

use std::fmt;

use serde::Serialize;

use crate::error::{CalcError, Result, ensure_finite};

/// Deterministic annual cost breakdown (€).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterministicCost {
    /// Energy component, `sum(load[h] * price[h])`.
    pub energy_cost: f64,
    pub fixed_costs: f64,
    pub total_cost: f64,
    /// Total consumption over the priced hours (kWh).
    pub consumption_kwh: f64,
    /// Number of priced hours.
    pub hours: usize,
    /// Consumption-weighted average price; `None` without consumption.
    pub average_price: Option<f64>,
}

/// Per-hour cost `load[h] * price[h]`.
pub(crate) fn hourly_costs(prices: &[f64], load: &[f64]) -> Result<Vec<f64>> {
    if prices.len() != load.len() {
        return Err(CalcError::invalid(
            "hourly_load",
            format!("expected {} values, got {}", prices.len(), load.len()),
        ));
    }
    Ok(prices.iter().zip(load).map(|(p, l)| p * l).collect())
}

/// Computes the deterministic cost for aligned price and load slices.
///
/// # Errors
///
/// [`CalcError::InvalidInput`] if the slices differ in length and
/// [`CalcError::Calculation`] if any total is not finite.
pub fn deterministic_cost(prices: &[f64], load: &[f64], fixed_costs: f64) -> Result<DeterministicCost> {
    let energy_cost = ensure_finite("energy cost", hourly_costs(prices, load)?.iter().sum())?;
    let consumption_kwh: f64 = load.iter().sum();
    let total_cost = ensure_finite("total cost", energy_cost + fixed_costs)?;
    let average_price = (consumption_kwh > 0.0).then(|| energy_cost / consumption_kwh);

    Ok(DeterministicCost {
        energy_cost,
        fixed_costs,
        total_cost,
        consumption_kwh,
        hours: prices.len(),
        average_price,
    })
}

impl fmt::Display for DeterministicCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hours priced:          {}", self.hours)?;
        writeln!(f, "Consumption:           {:.1} kWh", self.consumption_kwh)?;
        if let Some(avg) = self.average_price {
            writeln!(f, "Average price:         {avg:.4} EUR/kWh")?;
        }
        writeln!(f, "Energy cost:           EUR {:.2}", self.energy_cost)?;
        writeln!(f, "Fixed costs:           EUR {:.2}", self.fixed_costs)?;
        write!(f, "Total annual cost:     EUR {:.2}", self.total_cost)
    }
}
