//! Integration tests for annual cost, risk distribution and contract comparison.

mod common;

use tariff_sim::contract::{ArbitrageThresholds, ContractKind, DynamicTariff, FixedTariff};
use tariff_sim::cost::{
    AnnualCost, CostMode, Load, MonteCarloOptions, annual_cost_from_csv, compare_contracts,
    compute_annual_cost,
};
use tariff_sim::error::NO_VALID_PRICE_DATA;
use tariff_sim::prices::PriceSeries;

fn deterministic_total(cost: AnnualCost) -> f64 {
    match cost {
        AnnualCost::Deterministic(c) => c.total_cost,
        AnnualCost::Risk(r) => panic!("expected deterministic cost, got {r:?}"),
    }
}

#[test]
fn empty_sources_raise_canonical_message() {
    let err = annual_cost_from_csv(&["", ""], &Load::Flat(1.0), 0.0, CostMode::Deterministic)
        .unwrap_err();
    assert_eq!(err.to_string(), NO_VALID_PRICE_DATA);
    assert!(!err.is_recoverable());
}

#[test]
fn header_only_source_is_empty_too() {
    let err = annual_cost_from_csv(
        &["timestamp,price\n"],
        &Load::Flat(1.0),
        0.0,
        CostMode::MonteCarlo(MonteCarloOptions::default()),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), NO_VALID_PRICE_DATA);
}

#[test]
fn monte_carlo_smoke_on_three_hours() {
    let csv = "timestamp,price\n\
               2024-03-01T00:00:00Z,0.12\n\
               2024-03-01T01:00:00Z,0.15\n\
               2024-03-01T02:00:00Z,0.18\n";
    let options = MonteCarloOptions {
        iterations: 20,
        block_days: 1,
        seed: 42,
    };
    let cost = annual_cost_from_csv(&[csv], &Load::Flat(1.2), 100.0, CostMode::MonteCarlo(options))
        .unwrap();
    let AnnualCost::Risk(risk) = cost else {
        panic!("expected a risk distribution");
    };
    assert_eq!(risk.iterations, 20);
    assert!(risk.p10 <= risk.median && risk.median <= risk.p90);
    assert!((risk.median - 100.54).abs() < 1e-9);
}

#[test]
fn doubling_prices_doubles_energy_cost() {
    let series = common::winter_series(7);
    let doubled = series.map_prices(|p| p * 2.0);
    let load = Load::Flat(0.4);
    let fixed = 80.0;

    let base = deterministic_total(
        compute_annual_cost(&series, &load, fixed, CostMode::Deterministic).unwrap(),
    );
    let twice = deterministic_total(
        compute_annual_cost(&doubled, &load, fixed, CostMode::Deterministic).unwrap(),
    );
    assert!(((twice - fixed) - 2.0 * (base - fixed)).abs() < 1e-9);
}

#[test]
fn monte_carlo_is_reproducible_for_a_seed() {
    let series = common::winter_series(14);
    let mode = CostMode::MonteCarlo(MonteCarloOptions {
        iterations: 200,
        block_days: 3,
        seed: 7,
    });
    let a = compute_annual_cost(&series, &Load::Flat(0.5), 50.0, mode).unwrap();
    let b = compute_annual_cost(&series, &Load::Flat(0.5), 50.0, mode).unwrap();
    assert_eq!(a, b);
}

#[test]
fn dutch_export_format_prices_the_same() {
    let comma = PriceSeries::parse(&common::winter_csv(2)).unwrap().series;
    let semicolon = PriceSeries::parse(&common::winter_csv_semicolon(2))
        .unwrap()
        .series;
    assert_eq!(comma.len(), semicolon.len());

    let load = Load::Flat(1.0);
    let a = deterministic_total(
        compute_annual_cost(&comma, &load, 0.0, CostMode::Deterministic).unwrap(),
    );
    let b = deterministic_total(
        compute_annual_cost(&semicolon, &load, 0.0, CostMode::Deterministic).unwrap(),
    );
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn later_source_overrides_duplicate_hours() {
    let first = "timestamp,price\n2025-01-01T00:00:00Z,0.10\n2025-01-01T01:00:00Z,0.10\n";
    let second = "timestamp,price\n2025-01-01T01:00:00Z,0.30\n";
    let cost = annual_cost_from_csv(&[first, second], &Load::Flat(1.0), 0.0, CostMode::Deterministic)
        .unwrap();
    assert!((deterministic_total(cost) - 0.40).abs() < 1e-9);
}

#[test]
fn fixed_contract_wins_on_expensive_dynamic_week() {
    // Mean spot 0.17 plus 0.15 markup is above the 0.30 fixed price.
    let series = common::winter_series(7);
    let comparison = compare_contracts(
        &series,
        &Load::Flat(1.0),
        &FixedTariff {
            price_per_kwh: 0.30,
        },
        &DynamicTariff {
            markup_per_kwh: 0.15,
            arbitrage: ArbitrageThresholds::default(),
        },
        120.0,
    )
    .unwrap();
    assert_eq!(comparison.cheaper, ContractKind::Fixed);
    assert!((comparison.difference - 0.02 * 168.0).abs() < 1e-9);
    assert_eq!(comparison.fixed.hours, 168);
}
