//! CSV export for consumption profiles and battery cash flows.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::battery::BatteryScenarios;
use crate::profile::ConsumptionProfile;

/// Column header for the hourly consumption profile.
const PROFILE_HEADER: &str = "month,hour,base_kwh,heating_kwh,total_kwh";

/// Column header for the cumulative cash-flow table.
const CASH_FLOW_HEADER: &str = "year,huidig,na2027,dynamischOptimaal";

/// Exports the per-day kWh of every (month, hour) slot to a CSV file.
///
/// # Arguments
///
/// * `profile` - Normalized consumption profile
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_profile_csv(profile: &ConsumptionProfile, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_profile_csv(profile, io::BufWriter::new(file))
}

/// Writes the profile as CSV to any writer, months 1-12 and hours 0-23.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_profile_csv(profile: &ConsumptionProfile, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(PROFILE_HEADER.split(','))?;

    for month in 0..12 {
        for hour in 0..24 {
            let (base, heating) = profile.component_kwh_at(month, hour);
            wtr.write_record(&[
                (month + 1).to_string(),
                hour.to_string(),
                format!("{base:.6}"),
                format!("{heating:.6}"),
                format!("{:.6}", base + heating),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the cumulative cash flow of all scenarios to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cash_flow_csv(scenarios: &BatteryScenarios, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_cash_flow_csv(scenarios, io::BufWriter::new(file))
}

/// Writes one row per year with each scenario's cumulative position,
/// starting at year 0 (the purchase).
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cash_flow_csv(scenarios: &BatteryScenarios, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CASH_FLOW_HEADER.split(','))?;

    let [huidig, na2027, dynamisch] = scenarios.all();
    let years = huidig
        .cumulative_cash_flow
        .iter()
        .zip(&na2027.cumulative_cash_flow)
        .zip(&dynamisch.cumulative_cash_flow);
    for (year, ((h, n), d)) in years.enumerate() {
        wtr.write_record(&[
            year.to_string(),
            format!("{h:.2}"),
            format!("{n:.2}"),
            format!("{d:.2}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::{BatteryInput, BatteryProfile, HORIZON_YEARS, compute_scenarios};
    use crate::contract::{Contract, FixedTariff};
    use crate::profile::mix;

    fn profile() -> ConsumptionProfile {
        let m = mix(4000.0, 1995, Some(3)).unwrap();
        ConsumptionProfile::build(&m, 4000.0, 2024).unwrap()
    }

    fn scenarios() -> BatteryScenarios {
        let input = BatteryInput {
            battery: BatteryProfile::default(),
            annual_consumption_kwh: 3500.0,
            solar_production_kwh: 4000.0,
            self_consumption_without_pct: 30.0,
            self_consumption_with_pct: 60.0,
            import_price_per_kwh: 0.30,
            feed_in_tariff_per_kwh: 0.05,
            feed_in_cost_per_kwh: 0.10,
            contract: Contract::Fixed(FixedTariff {
                price_per_kwh: 0.30,
            }),
        };
        compute_scenarios(&input, None).unwrap()
    }

    #[test]
    fn profile_has_one_row_per_slot() {
        let mut buf = Vec::new();
        write_profile_csv(&profile(), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines.first().copied(), Some(PROFILE_HEADER));
        // 1 header + 12 * 24 slots
        assert_eq!(lines.len(), 289);
        assert!(lines[1].starts_with("1,0,"));
        assert!(lines[288].starts_with("12,23,"));
    }

    #[test]
    fn profile_rows_reintegrate_to_total() {
        let mut buf = Vec::new();
        write_profile_csv(&profile(), &mut buf).ok();
        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut total = 0.0;
        for record in rdr.records() {
            let rec = record.unwrap();
            let month: usize = rec[0].parse().unwrap();
            let kwh: f64 = rec[4].parse().unwrap();
            total += kwh * f64::from(crate::profile::days_in_month(2024, month - 1));
        }
        assert!((total - 4000.0).abs() < 0.01);
    }

    #[test]
    fn cash_flow_has_horizon_rows() {
        let mut buf = Vec::new();
        write_cash_flow_csv(&scenarios(), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines[0], CASH_FLOW_HEADER);
        assert_eq!(lines.len(), HORIZON_YEARS + 1);
        assert_eq!(lines[1], "0,-6000.00,-6000.00,-6000.00");
        assert!(lines[15].starts_with("14,"));
    }

    #[test]
    fn deterministic_output() {
        let s = scenarios();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_cash_flow_csv(&s, &mut buf1).ok();
        write_cash_flow_csv(&s, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }
}
