//! Fixed versus dynamic contract over the same load.

use std::fmt;

use serde::Serialize;

use super::{DeterministicCost, Load, deterministic_cost};
use crate::contract::{Contract, ContractKind, DynamicTariff, FixedTariff};
use crate::error::{CalcError, NO_VALID_PRICE_DATA, Result};
use crate::prices::PriceSeries;

/// Side-by-side annual cost of both contract types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractComparison {
    pub fixed: DeterministicCost,
    pub dynamic: DeterministicCost,
    /// `dynamic.total_cost - fixed.total_cost`; negative when dynamic wins.
    pub difference: f64,
    pub cheaper: ContractKind,
}

/// Prices `load` under a fixed tariff and under spot prices plus markup.
///
/// Both contracts share `fixed_costs`. Ties go to the fixed contract.
///
/// # Errors
///
/// Validation errors of either tariff or the load, and the empty-series
/// [`CalcError::Calculation`].
pub fn compare_contracts(
    series: &PriceSeries,
    load: &Load,
    fixed: &FixedTariff,
    dynamic: &DynamicTariff,
    fixed_costs: f64,
) -> Result<ContractComparison> {
    Contract::Fixed(*fixed).validate()?;
    Contract::Dynamic(*dynamic).validate()?;
    if !fixed_costs.is_finite() {
        return Err(CalcError::invalid("fixed_costs", "must be a number"));
    }
    load.validate()?;
    if series.is_empty() {
        return Err(CalcError::Calculation(NO_VALID_PRICE_DATA.to_string()));
    }

    let hourly_load = load.resolve(series.len())?;
    let fixed_prices = vec![fixed.price_per_kwh; series.len()];
    let dynamic_prices: Vec<f64> = series
        .prices()
        .into_iter()
        .map(|p| p + dynamic.markup_per_kwh)
        .collect();

    let fixed_cost = deterministic_cost(&fixed_prices, &hourly_load, fixed_costs)?;
    let dynamic_cost = deterministic_cost(&dynamic_prices, &hourly_load, fixed_costs)?;
    let difference = dynamic_cost.total_cost - fixed_cost.total_cost;
    let cheaper = if difference < 0.0 {
        ContractKind::Dynamic
    } else {
        ContractKind::Fixed
    };

    Ok(ContractComparison {
        fixed: fixed_cost,
        dynamic: dynamic_cost,
        difference,
        cheaper,
    })
}

impl fmt::Display for ContractComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Contract Comparison ---")?;
        writeln!(f, "Fixed (vast):          EUR {:.2}", self.fixed.total_cost)?;
        writeln!(f, "Dynamic (dynamisch):   EUR {:.2}", self.dynamic.total_cost)?;
        writeln!(f, "Difference:            EUR {:+.2}", self.difference)?;
        write!(f, "Cheaper:               {}", self.cheaper)
    }
}
