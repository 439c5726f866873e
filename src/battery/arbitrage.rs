//! Price-spread statistics and the arbitrage profit estimate.

use serde::Serialize;
use tracing::debug;

use super::types::BatteryProfile;
use crate::contract::ArbitrageThresholds;
use crate::error::{CalcError, NO_VALID_PRICE_DATA, Result, ensure_finite};
use crate::prices::{PriceSeries, percentile};

/// Days per year the profit estimate is scaled to.
const DAYS_PER_YEAR: f64 = 365.0;

/// Spread statistics of a price series and the yearly profit a battery of
/// the given size could make charging cheap and discharging expensive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageStats {
    /// Mean of the daily `max - min` price.
    pub mean_spread: f64,
    /// Full cycles per year left for arbitrage after solar shifting.
    pub estimated_cycles_per_year: f64,
    /// Yearly profit at nominal capacity (€).
    pub net_arbitrage_profit: f64,
    pub negative_price_hours: usize,
    /// Charge level, the low quantile of all prices.
    pub p20_low: f64,
    /// Discharge level, the high quantile of all prices.
    pub p20_high: f64,
    /// Days on which discharging the day's peak beats charging at its low
    /// after round-trip losses.
    pub profitable_days: usize,
    pub days: usize,
}

/// Derives [`ArbitrageStats`] from `series`.
///
/// `solar_cycles` is the number of full cycles per year already used for
/// shifting solar surplus; the remaining profitable days are available for
/// arbitrage. Profit is `(p_high - p_low) * efficiency * cycles * capacity`.
///
/// # Errors
///
/// [`CalcError::Calculation`] for an empty series or a non-finite result.
pub fn arbitrage_stats(
    series: &PriceSeries,
    thresholds: &ArbitrageThresholds,
    battery: &BatteryProfile,
    solar_cycles: f64,
) -> Result<ArbitrageStats> {
    if series.is_empty() {
        return Err(CalcError::Calculation(NO_VALID_PRICE_DATA.to_string()));
    }

    let mut sorted = series.prices();
    let negative_price_hours = sorted.iter().filter(|p| **p < 0.0).count();
    sorted.sort_by(f64::total_cmp);
    let p20_low = percentile(&sorted, thresholds.low_quantile).unwrap_or(f64::NAN);
    let p20_high = percentile(&sorted, thresholds.high_quantile).unwrap_or(f64::NAN);

    let eff = battery.round_trip_efficiency;
    let days = series.days();
    let mut spread_sum = 0.0;
    let mut profitable_days = 0;
    for prices in days.values() {
        let (min, max) = prices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(*p), hi.max(*p))
            });
        spread_sum += max - min;
        // A spread is needed, and discharging must beat the charge price after losses.
        if max - min > 0.0 && max * eff > min {
            profitable_days += 1;
        }
    }
    let day_count = days.len();
    let mean_spread = spread_sum / day_count as f64;
    let profitable_fraction = profitable_days as f64 / day_count as f64;

    let estimated_cycles_per_year = (DAYS_PER_YEAR * profitable_fraction - solar_cycles).max(0.0);
    let net_arbitrage_profit =
        (p20_high - p20_low) * eff * estimated_cycles_per_year * battery.capacity_kwh;

    let stats = ArbitrageStats {
        mean_spread: ensure_finite("mean spread", mean_spread)?,
        estimated_cycles_per_year,
        net_arbitrage_profit: ensure_finite("arbitrage profit", net_arbitrage_profit)?,
        negative_price_hours,
        p20_low: ensure_finite("low price quantile", p20_low)?,
        p20_high: ensure_finite("high price quantile", p20_high)?,
        profitable_days,
        days: day_count,
    };
    debug!(
        days = stats.days,
        profitable_days = stats.profitable_days,
        cycles = stats.estimated_cycles_per_year,
        profit = stats.net_arbitrage_profit,
        "arbitrage estimate"
    );
    Ok(stats)
}
