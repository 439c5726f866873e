//! Battery inputs and scenario outputs.

use serde::{Deserialize, Serialize};

use super::arbitrage::ArbitrageStats;
use crate::contract::Contract;
use crate::error::{CalcError, Result};

/// Accepted battery capacities (kWh).
pub const CAPACITY_RANGE_KWH: (f64, f64) = (5.0, 30.0);

/// Years covered by every cash-flow projection.
pub const HORIZON_YEARS: usize = 15;

/// Home battery under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryProfile {
    /// Usable capacity when new.
    pub capacity_kwh: f64,
    /// Installed price (€).
    pub price_euro: f64,
    /// Fraction of stored energy recovered, in (0, 1].
    pub round_trip_efficiency: f64,
    pub warranty_years: u32,
    /// Yearly capacity loss as a fraction, in [0, 1).
    pub degradation_per_year: f64,
}

impl Default for BatteryProfile {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            price_euro: 6000.0,
            round_trip_efficiency: 0.9,
            warranty_years: 10,
            degradation_per_year: 0.02,
        }
    }
}

impl BatteryProfile {
    /// Share of year-one-new performance left after `years`:
    /// `(1 - degradation_per_year)^years`.
    pub fn degradation_factor(&self, years: u32) -> f64 {
        (1.0 - self.degradation_per_year).powi(years as i32)
    }

    /// # Errors
    ///
    /// [`CalcError::Range`] for a capacity outside [`CAPACITY_RANGE_KWH`],
    /// [`CalcError::InvalidInput`] for the remaining fields.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = CAPACITY_RANGE_KWH;
        if !(min..=max).contains(&self.capacity_kwh) {
            return Err(CalcError::range("capacity_kwh", min, max, self.capacity_kwh));
        }
        if !(self.price_euro.is_finite() && self.price_euro > 0.0) {
            return Err(CalcError::invalid("price_euro", "must be greater than zero"));
        }
        if !(self.round_trip_efficiency > 0.0 && self.round_trip_efficiency <= 1.0) {
            return Err(CalcError::invalid(
                "round_trip_efficiency",
                "must lie in (0, 1]",
            ));
        }
        if !(0.0..1.0).contains(&self.degradation_per_year) {
            return Err(CalcError::invalid(
                "degradation_per_year",
                "must lie in [0, 1)",
            ));
        }
        if self.warranty_years == 0 {
            return Err(CalcError::invalid("warranty_years", "must be at least one year"));
        }
        Ok(())
    }
}

/// Everything the scenario engine needs besides the optional price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryInput {
    pub battery: BatteryProfile,
    pub annual_consumption_kwh: f64,
    /// Yearly solar production; zero without panels.
    #[serde(default)]
    pub solar_production_kwh: f64,
    /// Share of production consumed directly without a battery (percent).
    #[serde(default)]
    pub self_consumption_without_pct: f64,
    /// Share of production consumed directly with the battery (percent).
    #[serde(default)]
    pub self_consumption_with_pct: f64,
    /// Average all-in import price (€/kWh).
    pub import_price_per_kwh: f64,
    /// Paid per exported kWh once net metering ends (€/kWh).
    #[serde(default)]
    pub feed_in_tariff_per_kwh: f64,
    /// Charged by the supplier per exported kWh (€/kWh).
    #[serde(default)]
    pub feed_in_cost_per_kwh: f64,
    pub contract: Contract,
}

impl BatteryInput {
    pub fn has_solar(&self) -> bool {
        self.solar_production_kwh > 0.0
    }

    /// Validates every field before the engine touches them.
    ///
    /// # Errors
    ///
    /// The first violated constraint, as an [`CalcError::InvalidInput`] or
    /// [`CalcError::Range`].
    pub fn validate(&self) -> Result<()> {
        self.battery.validate()?;
        self.contract.validate()?;
        if !(self.annual_consumption_kwh.is_finite() && self.annual_consumption_kwh > 0.0) {
            return Err(CalcError::invalid(
                "annual_consumption_kwh",
                "must be a positive number",
            ));
        }
        if !(self.solar_production_kwh.is_finite() && self.solar_production_kwh >= 0.0) {
            return Err(CalcError::invalid(
                "solar_production_kwh",
                "must be a non-negative number",
            ));
        }
        for (field, pct) in [
            ("self_consumption_without_pct", self.self_consumption_without_pct),
            ("self_consumption_with_pct", self.self_consumption_with_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(CalcError::range(field, 0.0, 100.0, pct));
            }
        }
        if self.has_solar() && self.self_consumption_with_pct <= self.self_consumption_without_pct
        {
            return Err(CalcError::invalid(
                "self_consumption_with_pct",
                "must be higher than the self-consumption without battery",
            ));
        }
        if !(self.import_price_per_kwh.is_finite() && self.import_price_per_kwh > 0.0) {
            return Err(CalcError::invalid(
                "import_price_per_kwh",
                "must be greater than zero",
            ));
        }
        for (field, value) in [
            ("feed_in_tariff_per_kwh", self.feed_in_tariff_per_kwh),
            ("feed_in_cost_per_kwh", self.feed_in_cost_per_kwh),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CalcError::invalid(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }
}

/// One year's savings, split by origin (€).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsBreakdown {
    /// Value of battery-delivered solar energy that no longer has to be
    /// imported, net of feed-in income given up.
    pub self_consumption_gain: f64,
    /// Feed-in charges no longer paid on shifted energy.
    pub avoided_feed_in_cost: f64,
    pub arbitrage_gain: f64,
    /// Change in net-metering offset; negative because shifted energy no
    /// longer offsets imports.
    pub net_metering_benefit: f64,
    pub total: f64,
}

impl SavingsBreakdown {
    pub(crate) fn new(
        self_consumption_gain: f64,
        avoided_feed_in_cost: f64,
        arbitrage_gain: f64,
        net_metering_benefit: f64,
    ) -> Self {
        Self {
            self_consumption_gain,
            avoided_feed_in_cost,
            arbitrage_gain,
            net_metering_benefit,
            total: self_consumption_gain + avoided_feed_in_cost + arbitrage_gain
                + net_metering_benefit,
        }
    }
}

/// Fifteen-year outcome of one regulatory/contract scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    /// Savings in the first year of operation.
    pub savings_breakdown: SavingsBreakdown,
    /// First year whose cumulative cash flow is non-negative.
    pub payback_years: Option<u32>,
    /// Cumulative position per year: index 0 is the purchase
    /// (`-price_euro`), index `y` the position after `y` years of savings.
    pub cumulative_cash_flow: Vec<f64>,
    pub is_viable: bool,
    pub pays_back_within_warranty: bool,
}

impl ScenarioResult {
    /// Cumulative cash flow at the end of the horizon.
    pub fn final_cash_flow(&self) -> f64 {
        self.cumulative_cash_flow.last().copied().unwrap_or(0.0)
    }
}

/// Solar energy routed through the battery (eigenverbruik impact).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfConsumptionImpact {
    pub self_consumed_without_kwh: f64,
    pub self_consumed_with_kwh: f64,
    pub exported_without_kwh: f64,
    pub exported_with_kwh: f64,
    /// Solar energy stored per year when the battery is new.
    pub shifted_kwh: f64,
    /// Whether battery capacity, rather than the claimed self-consumption
    /// gain, limits the shifted energy.
    pub capacity_bound: bool,
}

/// The three scenarios plus optional diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryScenarios {
    pub huidig: ScenarioResult,
    pub na2027: ScenarioResult,
    #[serde(rename = "dynamischOptimaal")]
    pub dynamisch_optimaal: ScenarioResult,
    /// Present only when the household has solar production.
    #[serde(rename = "eigenverbruikImpact", skip_serializing_if = "Option::is_none")]
    pub eigenverbruik_impact: Option<SelfConsumptionImpact>,
    /// Present only for a dynamic contract.
    #[serde(rename = "arbitrageStats", skip_serializing_if = "Option::is_none")]
    pub arbitrage_stats: Option<ArbitrageStats>,
}

impl BatteryScenarios {
    /// Scenarios in presentation order.
    pub fn all(&self) -> [&ScenarioResult; 3] {
        [&self.huidig, &self.na2027, &self.dynamisch_optimaal]
    }
}
