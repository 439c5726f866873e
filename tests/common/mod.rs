//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use tariff_sim::battery::{BatteryInput, BatteryProfile};
use tariff_sim::contract::{ArbitrageThresholds, Contract, DynamicTariff, FixedTariff};
use tariff_sim::prices::PriceSeries;

/// Hourly CSV for `days` consecutive January days (comma separated, UTC).
///
/// Prices follow a winter day: cheap night, morning bump, evening peak.
pub fn winter_csv(days: u32) -> String {
    let mut csv = String::from("timestamp,price\n");
    for day in 1..=days {
        for hour in 0..24 {
            let price = match hour {
                0..=5 => 0.08,
                6..=9 => 0.21,
                17..=20 => 0.34,
                _ => 0.14,
            };
            csv.push_str(&format!("2025-01-{day:02}T{hour:02}:00:00Z,{price}\n"));
        }
    }
    csv
}

/// Same shape as [`winter_csv`] in the Dutch export format
/// (semicolon separated, decimal commas, local offset).
pub fn winter_csv_semicolon(days: u32) -> String {
    winter_csv(days)
        .lines()
        .map(|line| {
            let (ts, price) = line.split_once(',').unwrap_or((line, ""));
            format!("{};{}\n", ts.replace('Z', "+01:00"), price.replace('.', ","))
        })
        .collect()
}

/// Parsed [`winter_csv`].
pub fn winter_series(days: u32) -> PriceSeries {
    PriceSeries::parse(&winter_csv(days)).unwrap().series
}

/// 10 kWh battery for 6000 euro, 90% round trip, 10 year warranty, 2% fade.
pub fn default_battery() -> BatteryProfile {
    BatteryProfile::default()
}

/// Solar household on the given contract.
pub fn solar_input(contract: Contract) -> BatteryInput {
    BatteryInput {
        battery: default_battery(),
        annual_consumption_kwh: 3500.0,
        solar_production_kwh: 4000.0,
        self_consumption_without_pct: 30.0,
        self_consumption_with_pct: 60.0,
        import_price_per_kwh: 0.30,
        feed_in_tariff_per_kwh: 0.05,
        feed_in_cost_per_kwh: 0.11,
        contract,
    }
}

pub fn fixed_contract() -> Contract {
    Contract::Fixed(FixedTariff {
        price_per_kwh: 0.30,
    })
}

pub fn dynamic_contract() -> Contract {
    Contract::Dynamic(DynamicTariff {
        markup_per_kwh: 0.15,
        arbitrage: ArbitrageThresholds::default(),
    })
}
