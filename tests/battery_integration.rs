//! Integration tests for the battery payback scenarios.

mod common;

use tariff_sim::CalcError;
use tariff_sim::battery::{BatteryProfile, HORIZON_YEARS, compute_scenarios};

#[test]
fn every_scenario_spans_the_horizon() {
    let input = common::solar_input(common::fixed_contract());
    let scenarios = compute_scenarios(&input, None).unwrap();
    for result in scenarios.all() {
        let cf = &result.cumulative_cash_flow;
        assert_eq!(cf.len(), HORIZON_YEARS);
        assert_eq!(cf[0], -input.battery.price_euro, "{}", result.name);
        let expected = -input.battery.price_euro + result.savings_breakdown.total;
        assert!((cf[1] - expected).abs() < 1e-9, "{}", result.name);
    }
    let names: Vec<&str> = scenarios.all().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["huidig", "na2027", "dynamischOptimaal"]);
}

#[test]
fn ageing_battery_saves_less_each_year() {
    let input = common::solar_input(common::fixed_contract());
    let scenarios = compute_scenarios(&input, None).unwrap();
    assert!(!scenarios.eigenverbruik_impact.unwrap().capacity_bound);
    let cf = &scenarios.na2027.cumulative_cash_flow;
    let steps: Vec<f64> = cf.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(steps.windows(2).all(|w| w[1] < w[0]), "{steps:?}");
    assert!(steps[13] < steps[0]);
}

#[test]
fn payback_year_indexes_the_cash_flow() {
    let mut input = common::solar_input(common::fixed_contract());
    input.battery.price_euro = 1500.0;
    let scenarios = compute_scenarios(&input, None).unwrap();
    let na2027 = &scenarios.na2027;
    let year = na2027.payback_years.unwrap() as usize;
    assert!(year >= 1);
    assert!(na2027.cumulative_cash_flow[year] >= 0.0);
    assert!(na2027.cumulative_cash_flow[year - 1] < 0.0);
}

#[test]
fn warranty_flag_matches_payback_year() {
    let mut input = common::solar_input(common::fixed_contract());
    for price_euro in [500.0, 2000.0, 6000.0, 20000.0] {
        input.battery.price_euro = price_euro;
        let scenarios = compute_scenarios(&input, None).unwrap();
        for result in scenarios.all() {
            assert_eq!(result.is_viable, result.payback_years.is_some());
            assert_eq!(
                result.pays_back_within_warranty,
                result
                    .payback_years
                    .is_some_and(|y| y <= input.battery.warranty_years)
            );
        }
    }
}

#[test]
fn fixed_contract_has_no_arbitrage_stats() {
    let input = common::solar_input(common::fixed_contract());
    let series = common::winter_series(7);
    let scenarios = compute_scenarios(&input, Some(&series)).unwrap();
    assert!(scenarios.arbitrage_stats.is_none());
    assert!(scenarios.eigenverbruik_impact.is_some());
}

#[test]
fn dynamic_contract_needs_prices() {
    let input = common::solar_input(common::dynamic_contract());
    let err = compute_scenarios(&input, None).unwrap_err();
    assert!(matches!(err, CalcError::MissingData { ref field } if field == "prices"));
}

#[test]
fn arbitrage_never_lowers_the_dynamic_scenario() {
    let input = common::solar_input(common::dynamic_contract());
    let series = common::winter_series(14);
    let scenarios = compute_scenarios(&input, Some(&series)).unwrap();
    let stats = scenarios.arbitrage_stats.unwrap();
    assert!(stats.net_arbitrage_profit >= 0.0);
    assert!(scenarios.dynamisch_optimaal.final_cash_flow() >= scenarios.na2027.final_cash_flow());
}

#[test]
fn capacity_outside_range_is_rejected() {
    let mut input = common::solar_input(common::fixed_contract());
    input.battery = BatteryProfile {
        capacity_kwh: 40.0,
        ..BatteryProfile::default()
    };
    let err = compute_scenarios(&input, None).unwrap_err();
    assert_eq!(err.kind(), "range");
}

#[test]
fn household_without_solar_has_no_self_consumption_impact() {
    let mut input = common::solar_input(common::fixed_contract());
    input.solar_production_kwh = 0.0;
    input.self_consumption_without_pct = 0.0;
    input.self_consumption_with_pct = 0.0;
    let scenarios = compute_scenarios(&input, None).unwrap();
    assert!(scenarios.eigenverbruik_impact.is_none());
    assert!(scenarios.all().iter().all(|r| !r.is_viable));
}
