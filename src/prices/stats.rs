//! Grouped price statistics and percentile helpers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

use super::series::PriceSeries;

/// Meteorological season derived from the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Maps a month (1-12) to its season: Dec-Feb winter, Mar-May spring,
    /// Jun-Aug summer, Sep-Nov autumn.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
        }
    }
}

/// Weekday/weekend split by ISO day of week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Saturday and Sunday are weekend days.
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => Self::Weekend,
            _ => Self::Weekday,
        }
    }
}

/// Key of one statistics group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    /// Hour of day, 0-23.
    Hour(u32),
    /// Calendar month, 1-12.
    Month(u32),
    DayType(DayType),
    Season(Season),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hour(h) => write!(f, "hour {h:02}"),
            Self::Month(m) => write!(f, "month {m:02}"),
            Self::DayType(DayType::Weekday) => f.write_str("weekday"),
            Self::DayType(DayType::Weekend) => f.write_str("weekend"),
            Self::Season(s) => f.write_str(s.label()),
        }
    }
}

/// Summary statistics of the prices in one group (€/kWh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Number of hourly prices in the group.
    pub count: usize,
}

/// Running aggregate for one group; finalized into [`PriceStats`].
#[derive(Debug, Clone)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
    values: Vec<f64>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            values: Vec::new(),
        }
    }

    fn push(&mut self, price: f64) {
        self.sum += price;
        self.min = self.min.min(price);
        self.max = self.max.max(price);
        self.values.push(price);
    }

    fn finish(mut self) -> PriceStats {
        let count = self.values.len();
        self.values.sort_by(f64::total_cmp);
        PriceStats {
            min: self.min,
            max: self.max,
            mean: self.sum / count as f64,
            median: median_of_sorted(&self.values),
            count,
        }
    }
}

/// One flattened row of [`GroupedPriceStats`], convenient for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsRow {
    pub group: String,
    #[serde(flatten)]
    pub stats: PriceStats,
}

/// Price statistics grouped by hour of day, month, day type and season.
///
/// Derived from a [`PriceSeries`] on demand; never mutated on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedPriceStats {
    groups: BTreeMap<GroupKey, PriceStats>,
}

impl GroupedPriceStats {
    /// Computes statistics for every group present in `series`.
    pub fn from_series(series: &PriceSeries) -> Self {
        let mut acc: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
        for (ts, price) in series.iter() {
            let keys = [
                GroupKey::Hour(ts.hour()),
                GroupKey::Month(ts.month()),
                GroupKey::DayType(DayType::from_weekday(ts.weekday())),
                GroupKey::Season(Season::from_month(ts.month())),
            ];
            for key in keys {
                acc.entry(key).or_insert_with(Accumulator::new).push(price);
            }
        }

        Self {
            groups: acc.into_iter().map(|(k, a)| (k, a.finish())).collect(),
        }
    }

    /// Statistics for `key`, if the series had any price in that group.
    pub fn get(&self, key: GroupKey) -> Option<&PriceStats> {
        self.groups.get(&key)
    }

    /// Whether no group was populated.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over all groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &PriceStats)> + '_ {
        self.groups.iter()
    }

    /// Hour-of-day groups in order 0-23 (absent hours skipped).
    pub fn by_hour(&self) -> Vec<(u32, PriceStats)> {
        self.groups
            .iter()
            .filter_map(|(k, s)| match k {
                GroupKey::Hour(h) => Some((*h, *s)),
                _ => None,
            })
            .collect()
    }

    /// Flattens every group into labelled rows.
    pub fn rows(&self) -> Vec<GroupStatsRow> {
        self.groups
            .iter()
            .map(|(k, s)| GroupStatsRow {
                group: k.to_string(),
                stats: *s,
            })
            .collect()
    }
}

/// Shorthand for [`GroupedPriceStats::from_series`].
pub fn summarize(series: &PriceSeries) -> GroupedPriceStats {
    GroupedPriceStats::from_series(series)
}

impl fmt::Display for GroupedPriceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Price statistics (EUR/kWh) ---")?;
        writeln!(
            f,
            "{:<10} {:>8} {:>8} {:>8} {:>8} {:>6}",
            "group", "min", "max", "mean", "median", "hours"
        )?;
        for (key, s) in &self.groups {
            writeln!(
                f,
                "{:<10} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>6}",
                key.to_string(),
                s.min,
                s.max,
                s.mean,
                s.median,
                s.count
            )?;
        }
        Ok(())
    }
}

/// Value at fraction `p` of an ascending slice using index `floor(n * p)`,
/// clamped to the last element. No interpolation.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    let idx = ((n as f64 * p.clamp(0.0, 1.0)).floor() as usize).min(n - 1);
    Some(sorted[idx])
}

/// Conventional median of an ascending slice (mean of the middle pair for
/// even lengths). Returns NaN for an empty slice.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
