//! Spreading an [`EnergyMix`] over a 12 x 24 (month x hour) grid.

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;
use tracing::debug;

use super::mix::EnergyMix;
use super::shapes::{BASE_MONTHLY, HEATING_MONTHLY, base_shape, heating_shape, relative_monthly};
use crate::error::{CalcError, Result, ensure_finite};
use crate::prices::PriceSeries;

/// Relative slack allowed between a mix total and the profile total.
const MIX_TOLERANCE: f64 = 1e-9;

/// Share of annual consumption falling in one hour of one day of a month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourFraction {
    pub base_fraction: f64,
    pub heating_fraction: f64,
}

impl HourFraction {
    pub fn total(&self) -> f64 {
        self.base_fraction + self.heating_fraction
    }
}

/// Locally scaled fraction for `hour` (0-23) in `month` (0-11).
///
/// `shape[hour] * component_weight * monthly[month] / mean(monthly)` for
/// each component. The result is not normalized against month lengths;
/// [`ConsumptionProfile::build`] performs that second pass.
pub(crate) fn hourly_fraction(
    hour: usize,
    month: usize,
    mix: &EnergyMix,
    total_kwh: f64,
) -> HourFraction {
    let base_weight = mix.base_kwh / total_kwh;
    let heating_weight = mix.heating_kwh / total_kwh;
    HourFraction {
        base_fraction: base_shape()[hour] * base_weight * relative_monthly(&BASE_MONTHLY, month),
        heating_fraction: heating_shape()[hour]
            * heating_weight
            * relative_monthly(&HEATING_MONTHLY, month),
    }
}

/// Number of days in `month` (0-11) of `year`.
pub fn days_in_month(year: i32, month: usize) -> u32 {
    match month {
        1 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Normalized hourly consumption fractions for one calendar year.
///
/// Invariant: `sum(fraction * days_in_month)` over the grid equals the
/// component weight for base and heating separately, so the whole grid
/// integrates to exactly one year of consumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionProfile {
    year: i32,
    total_kwh: f64,
    mix: EnergyMix,
    slots: [[HourFraction; 24]; 12],
}

impl ConsumptionProfile {
    /// Builds the profile for `year` and renormalizes it against the actual
    /// month lengths of that year.
    ///
    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] for a non-positive total or a mix that
    /// does not add up to it, [`CalcError::Calculation`] when a scale factor
    /// is not finite.
    pub fn build(mix: &EnergyMix, total_kwh: f64, year: i32) -> Result<Self> {
        if !(total_kwh.is_finite() && total_kwh > 0.0) {
            return Err(CalcError::invalid("annual_kwh", "must be a positive number"));
        }
        if (mix.total_kwh() - total_kwh).abs() > MIX_TOLERANCE * total_kwh {
            return Err(CalcError::invalid(
                "annual_kwh",
                format!(
                    "must equal base plus heating consumption ({} kWh)",
                    mix.total_kwh()
                ),
            ));
        }

        let mut slots = [[HourFraction::default(); 24]; 12];
        let mut base_sum = 0.0;
        let mut heating_sum = 0.0;
        for (month, row) in slots.iter_mut().enumerate() {
            let days = f64::from(days_in_month(year, month));
            for (hour, slot) in row.iter_mut().enumerate() {
                *slot = hourly_fraction(hour, month, mix, total_kwh);
                base_sum += slot.base_fraction * days;
                heating_sum += slot.heating_fraction * days;
            }
        }

        let base_scale = rescale_factor("base", mix.base_kwh / total_kwh, base_sum)?;
        let heating_scale = rescale_factor("heating", mix.heating_kwh / total_kwh, heating_sum)?;
        for slot in slots.iter_mut().flatten() {
            slot.base_fraction *= base_scale;
            slot.heating_fraction *= heating_scale;
        }

        debug!(year, total_kwh, base_scale, heating_scale, "built consumption profile");
        Ok(Self {
            year,
            total_kwh,
            mix: *mix,
            slots,
        })
    }

    /// Calendar year the profile was normalized for.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Annual consumption the profile distributes.
    pub fn total_kwh(&self) -> f64 {
        self.total_kwh
    }

    /// Underlying base/heating split.
    pub fn mix(&self) -> &EnergyMix {
        &self.mix
    }

    /// Fractions for `month` (0-11) and `hour` (0-23); `None` outside the grid.
    pub fn fraction(&self, month: usize, hour: usize) -> Option<HourFraction> {
        self.slots.get(month)?.get(hour).copied()
    }

    /// Consumption (kWh) in `hour` of a single day in `month`.
    pub(crate) fn kwh_at(&self, month: usize, hour: usize) -> f64 {
        self.slots[month][hour].total() * self.total_kwh
    }

    /// Base and heating kWh for `hour` of a single day in `month`.
    pub(crate) fn component_kwh_at(&self, month: usize, hour: usize) -> (f64, f64) {
        let slot = self.slots[month][hour];
        (
            slot.base_fraction * self.total_kwh,
            slot.heating_fraction * self.total_kwh,
        )
    }

    /// Sum of `kwh_at * days_in_month` over the grid; equals `total_kwh`.
    pub fn annual_kwh(&self) -> f64 {
        (0..12)
            .map(|m| {
                let days = f64::from(days_in_month(self.year, m));
                (0..24).map(|h| self.kwh_at(m, h)).sum::<f64>() * days
            })
            .sum()
    }

    /// One consumption value per price point, aligned with the series order.
    pub fn hourly_load_for(&self, series: &PriceSeries) -> Vec<f64> {
        series
            .iter()
            .map(|(ts, _)| self.kwh_at(ts.month0() as usize, ts.hour() as usize))
            .collect()
    }
}

fn rescale_factor(component: &str, weight: f64, grid_sum: f64) -> Result<f64> {
    if weight == 0.0 || grid_sum == 0.0 {
        return Ok(0.0);
    }
    ensure_finite(&format!("{component} normalization factor"), weight / grid_sum)
}
