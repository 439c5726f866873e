use std::process::{Command, Output};

const PRICES: &str = "tests/data/prices_week.csv";

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tariff-sim"))
        .args(args)
        .output()
        .expect("tariff-sim process should run")
}

fn run_scenario(path: &str) -> String {
    let output = run_cli(&["--scenario", path, "--prices", PRICES]);
    assert!(
        output.status.success(),
        "scenario run failed for {path}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));

    let numeric = raw.strip_prefix("EUR").unwrap_or(raw).trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from line `{line}`"))
}

#[test]
fn scenario_presets_run_via_cli_and_produce_distinct_costs() {
    let baseline = run_scenario("scenarios/baseline.toml");
    let all_electric = run_scenario("scenarios/all_electric.toml");
    let solar_battery = run_scenario("scenarios/solar_battery.toml");

    assert!(baseline.contains("Prices: 168 hours (1 rows skipped)"));
    assert!(baseline.contains("Total annual cost:"));
    assert!(all_electric.contains("Median:"));
    assert!(solar_battery.contains("--- Battery Scenarios ---"));

    let baseline_fixed = parse_metric(&baseline, "Fixed (vast):");
    let electric_fixed = parse_metric(&all_electric, "Fixed (vast):");
    assert!(
        electric_fixed > baseline_fixed,
        "expected heat pump household to cost more: baseline={baseline_fixed:.2}, all_electric={electric_fixed:.2}"
    );
}

#[test]
fn preset_flag_matches_scenario_file() {
    let from_file = run_scenario("scenarios/baseline.toml");
    let output = run_cli(&["--preset", "baseline", "--prices", PRICES]);
    assert!(output.status.success());
    let from_preset = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert_eq!(
        parse_metric(&from_file, "Fixed (vast):"),
        parse_metric(&from_preset, "Fixed (vast):")
    );
}

#[test]
fn cash_flow_export_writes_one_row_per_year() {
    let path = std::env::temp_dir().join(format!("tariff-sim-cashflow-{}.csv", std::process::id()));
    let path_arg = path.to_string_lossy().to_string();
    let output = run_cli(&[
        "--preset",
        "solar_battery",
        "--prices",
        PRICES,
        "--cashflow-out",
        &path_arg,
    ]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(&path).expect("cash flow CSV should exist");
    let _ = std::fs::remove_file(&path);
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("year,huidig,na2027,dynamischOptimaal"));
    assert!(lines.next().is_some_and(|row| row.starts_with("0,-")));
    assert_eq!(lines.count(), 14);
}

#[test]
fn header_only_prices_exit_with_error() {
    let output = run_cli(&["--prices", "tests/data/header_only.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn unknown_preset_exits_with_error() {
    let output = run_cli(&["--preset", "mansion", "--prices", PRICES]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}
