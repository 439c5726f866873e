//! TOML-based run configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::battery::{BatteryInput, BatteryProfile, CAPACITY_RANGE_KWH};
use crate::contract::{ArbitrageThresholds, Contract, ContractKind, DynamicTariff, FixedTariff};
use crate::cost::{CostMode, MonteCarloOptions};
use crate::prices::PriceSeries;
use crate::profile::{HeatingType, HouseholdProfile};

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the baseline household. Load from
/// TOML with [`RunConfig::from_toml_file`] or use [`RunConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Household consumption and heating.
    #[serde(default)]
    pub household: HouseholdConfig,
    /// Contract prices and fixed costs.
    #[serde(default)]
    pub tariffs: TariffConfig,
    /// Monte Carlo risk estimation.
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
    /// Rooftop solar production.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Home battery under evaluation.
    #[serde(default)]
    pub battery: BatteryConfig,
}

/// Household consumption and heating.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseholdConfig {
    /// Annual electricity consumption (kWh, must be > 0).
    pub annual_kwh: f64,
    /// `"gas"`, `"hybrid"` or `"all-electric"`.
    pub heating: HeatingType,
    /// Construction year of the dwelling.
    pub build_year: i32,
    /// Household size, 1-5 selects the NIBUD table.
    pub persons: Option<u32>,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            annual_kwh: 2900.0,
            heating: HeatingType::Gas,
            build_year: 1985,
            persons: Some(3),
        }
    }
}

/// Contract prices and fixed costs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Contract under evaluation: `"vast"` or `"dynamisch"`.
    pub contract: ContractKind,
    /// All-in fixed-contract price (€/kWh).
    pub fixed_price_per_kwh: f64,
    /// Markup plus taxes on top of the spot price (€/kWh).
    pub dynamic_markup_per_kwh: f64,
    /// Standing charges minus tax refund (€/year, may be negative).
    pub fixed_costs_per_year: f64,
    /// Paid per exported kWh without net metering (€/kWh).
    pub feed_in_tariff_per_kwh: f64,
    /// Charged per exported kWh (€/kWh).
    pub feed_in_cost_per_kwh: f64,
    /// Arbitrage charge quantile.
    pub low_quantile: f64,
    /// Arbitrage discharge quantile.
    pub high_quantile: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        let q = ArbitrageThresholds::default();
        Self {
            contract: ContractKind::Fixed,
            fixed_price_per_kwh: 0.28,
            dynamic_markup_per_kwh: 0.15,
            fixed_costs_per_year: 120.0,
            feed_in_tariff_per_kwh: 0.05,
            feed_in_cost_per_kwh: 0.11,
            low_quantile: q.low_quantile,
            high_quantile: q.high_quantile,
        }
    }
}

/// Monte Carlo risk estimation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonteCarloConfig {
    /// Run the block bootstrap instead of the deterministic sum.
    pub enabled: bool,
    /// Number of trials (must be > 0).
    pub iterations: usize,
    /// Block length in days (must be > 0).
    pub block_days: usize,
    /// Random seed.
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        let o = MonteCarloOptions::default();
        Self {
            enabled: false,
            iterations: o.iterations,
            block_days: o.block_days,
            seed: o.seed,
        }
    }
}

/// Rooftop solar production.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Yearly production (kWh, 0 without panels).
    pub production_kwh: f64,
    /// Directly self-consumed share without battery (percent).
    pub self_consumption_pct: f64,
    /// Self-consumed share with battery (percent).
    pub self_consumption_with_battery_pct: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            production_kwh: 0.0,
            self_consumption_pct: 30.0,
            self_consumption_with_battery_pct: 60.0,
        }
    }
}

/// Home battery under evaluation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Compute the payback scenarios.
    pub enabled: bool,
    /// Usable capacity (kWh, 5-30).
    pub capacity_kwh: f64,
    /// Installed price (€).
    pub price_euro: f64,
    /// Round-trip efficiency (0.0-1.0].
    pub round_trip_efficiency: f64,
    /// Warranty period (years).
    pub warranty_years: u32,
    /// Yearly capacity loss [0.0-1.0).
    pub degradation_per_year: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        let b = BatteryProfile::default();
        Self {
            enabled: false,
            capacity_kwh: b.capacity_kwh,
            price_euro: b.price_euro,
            round_trip_efficiency: b.round_trip_efficiency,
            warranty_years: b.warranty_years,
            degradation_per_year: b.degradation_per_year,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"household.annual_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl RunConfig {
    /// Returns the baseline run: gas-heated terraced house on a fixed contract.
    pub fn baseline() -> Self {
        Self {
            household: HouseholdConfig::default(),
            tariffs: TariffConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
            solar: SolarConfig::default(),
            battery: BatteryConfig::default(),
        }
    }

    /// Returns the all-electric preset: heat pump on a dynamic contract with
    /// Monte Carlo risk bands.
    pub fn all_electric() -> Self {
        Self {
            household: HouseholdConfig {
                annual_kwh: 6500.0,
                heating: HeatingType::AllElectric,
                build_year: 2012,
                persons: Some(4),
            },
            tariffs: TariffConfig {
                contract: ContractKind::Dynamic,
                ..TariffConfig::default()
            },
            monte_carlo: MonteCarloConfig {
                enabled: true,
                ..MonteCarloConfig::default()
            },
            solar: SolarConfig::default(),
            battery: BatteryConfig::default(),
        }
    }

    /// Returns the solar-battery preset: rooftop PV plus a 10 kWh battery on a
    /// dynamic contract.
    pub fn solar_battery() -> Self {
        Self {
            household: HouseholdConfig {
                annual_kwh: 4200.0,
                heating: HeatingType::Hybrid,
                build_year: 1998,
                persons: Some(4),
            },
            tariffs: TariffConfig {
                contract: ContractKind::Dynamic,
                ..TariffConfig::default()
            },
            monte_carlo: MonteCarloConfig::default(),
            solar: SolarConfig {
                production_kwh: 4500.0,
                self_consumption_pct: 30.0,
                self_consumption_with_battery_pct: 65.0,
            },
            battery: BatteryConfig {
                enabled: true,
                ..BatteryConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "all_electric", "solar_battery"];

    /// Loads a run configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "all_electric" => Ok(Self::all_electric()),
            "solar_battery" => Ok(Self::solar_battery()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a run configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a run configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    pub fn household(&self) -> HouseholdProfile {
        let h = &self.household;
        HouseholdProfile {
            annual_kwh: h.annual_kwh,
            heating_type: h.heating,
            build_year: h.build_year,
            persons: h.persons,
        }
    }

    pub fn fixed_tariff(&self) -> FixedTariff {
        FixedTariff {
            price_per_kwh: self.tariffs.fixed_price_per_kwh,
        }
    }

    pub fn dynamic_tariff(&self) -> DynamicTariff {
        DynamicTariff {
            markup_per_kwh: self.tariffs.dynamic_markup_per_kwh,
            arbitrage: ArbitrageThresholds {
                low_quantile: self.tariffs.low_quantile,
                high_quantile: self.tariffs.high_quantile,
            },
        }
    }

    /// The configured contract with its variant's parameters.
    pub fn contract(&self) -> Contract {
        match self.tariffs.contract {
            ContractKind::Fixed => Contract::Fixed(self.fixed_tariff()),
            ContractKind::Dynamic => Contract::Dynamic(self.dynamic_tariff()),
        }
    }

    pub fn monte_carlo(&self) -> MonteCarloOptions {
        let mc = &self.monte_carlo;
        MonteCarloOptions {
            iterations: mc.iterations,
            block_days: mc.block_days,
            seed: mc.seed,
        }
    }

    pub fn cost_mode(&self) -> CostMode {
        if self.monte_carlo.enabled {
            CostMode::MonteCarlo(self.monte_carlo())
        } else {
            CostMode::Deterministic
        }
    }

    /// Average import price under the configured contract.
    ///
    /// For a dynamic contract this is the mean spot price plus markup; with
    /// no prices available it falls back to the fixed price.
    pub fn import_price_per_kwh(&self, series: &PriceSeries) -> f64 {
        match self.tariffs.contract {
            ContractKind::Dynamic if !series.is_empty() => {
                let prices = series.prices();
                prices.iter().sum::<f64>() / prices.len() as f64
                    + self.tariffs.dynamic_markup_per_kwh
            }
            _ => self.tariffs.fixed_price_per_kwh,
        }
    }

    /// Battery scenario input, or `None` when the battery section is disabled.
    pub fn battery_input(&self, import_price_per_kwh: f64) -> Option<BatteryInput> {
        if !self.battery.enabled {
            return None;
        }
        let b = &self.battery;
        Some(BatteryInput {
            battery: BatteryProfile {
                capacity_kwh: b.capacity_kwh,
                price_euro: b.price_euro,
                round_trip_efficiency: b.round_trip_efficiency,
                warranty_years: b.warranty_years,
                degradation_per_year: b.degradation_per_year,
            },
            annual_consumption_kwh: self.household.annual_kwh,
            solar_production_kwh: self.solar.production_kwh,
            self_consumption_without_pct: self.solar.self_consumption_pct,
            self_consumption_with_pct: self.solar.self_consumption_with_battery_pct,
            import_price_per_kwh,
            feed_in_tariff_per_kwh: self.tariffs.feed_in_tariff_per_kwh,
            feed_in_cost_per_kwh: self.tariffs.feed_in_cost_per_kwh,
            contract: self.contract(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let h = &self.household;
        if !(h.annual_kwh.is_finite() && h.annual_kwh > 0.0) {
            errors.push(ConfigError::new("household.annual_kwh", "must be > 0"));
        }
        if !(1800..=2100).contains(&h.build_year) {
            errors.push(ConfigError::new(
                "household.build_year",
                "must be in [1800, 2100]",
            ));
        }
        if h.persons == Some(0) {
            errors.push(ConfigError::new("household.persons", "must be > 0"));
        }

        let t = &self.tariffs;
        if t.fixed_price_per_kwh < 0.0 {
            errors.push(ConfigError::new("tariffs.fixed_price_per_kwh", "must be >= 0"));
        }
        if t.feed_in_tariff_per_kwh < 0.0 {
            errors.push(ConfigError::new("tariffs.feed_in_tariff_per_kwh", "must be >= 0"));
        }
        if t.feed_in_cost_per_kwh < 0.0 {
            errors.push(ConfigError::new("tariffs.feed_in_cost_per_kwh", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&t.low_quantile) || !(0.0..=1.0).contains(&t.high_quantile) {
            errors.push(ConfigError::new(
                "tariffs.low_quantile",
                "quantiles must be in [0.0, 1.0]",
            ));
        } else if t.low_quantile > t.high_quantile {
            errors.push(ConfigError::new(
                "tariffs.low_quantile",
                "must be <= tariffs.high_quantile",
            ));
        }

        let mc = &self.monte_carlo;
        if mc.iterations == 0 {
            errors.push(ConfigError::new("monte_carlo.iterations", "must be > 0"));
        }
        if mc.block_days == 0 {
            errors.push(ConfigError::new("monte_carlo.block_days", "must be > 0"));
        }

        let s = &self.solar;
        if s.production_kwh < 0.0 {
            errors.push(ConfigError::new("solar.production_kwh", "must be >= 0"));
        }
        for (field, pct) in [
            ("solar.self_consumption_pct", s.self_consumption_pct),
            (
                "solar.self_consumption_with_battery_pct",
                s.self_consumption_with_battery_pct,
            ),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                errors.push(ConfigError::new(field, "must be in [0, 100]"));
            }
        }

        let b = &self.battery;
        if b.enabled {
            if s.production_kwh > 0.0 && s.self_consumption_with_battery_pct <= s.self_consumption_pct
            {
                errors.push(ConfigError::new(
                    "solar.self_consumption_with_battery_pct",
                    "must be > solar.self_consumption_pct",
                ));
            }
            let (min, max) = CAPACITY_RANGE_KWH;
            if !(min..=max).contains(&b.capacity_kwh) {
                errors.push(ConfigError::new(
                    "battery.capacity_kwh",
                    format!("must be in [{min}, {max}]"),
                ));
            }
            if b.price_euro <= 0.0 {
                errors.push(ConfigError::new("battery.price_euro", "must be > 0"));
            }
            if !(b.round_trip_efficiency > 0.0 && b.round_trip_efficiency <= 1.0) {
                errors.push(ConfigError::new(
                    "battery.round_trip_efficiency",
                    "must be in (0.0, 1.0]",
                ));
            }
            if !(0.0..1.0).contains(&b.degradation_per_year) {
                errors.push(ConfigError::new(
                    "battery.degradation_per_year",
                    "must be in [0.0, 1.0)",
                ));
            }
            if b.warranty_years == 0 {
                errors.push(ConfigError::new("battery.warranty_years", "must be > 0"));
            }
        }

        errors
    }
}
