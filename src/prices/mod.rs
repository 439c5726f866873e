//! Hourly price ingestion and statistics.

/// CSV parsing into a timestamp-keyed series.
pub mod series;
pub mod stats;

pub use series::{ParsedPrices, PriceSeries};
pub use stats::{
    DayType, GroupKey, GroupStatsRow, GroupedPriceStats, PriceStats, Season, percentile, summarize,
};
