//! Parsing of raw hourly price text into a timestamp-keyed series.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::{CalcError, Result};

/// Header substrings identifying the timestamp column (case-insensitive).
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "datetime", "time"];
/// Header substrings identifying the price column (case-insensitive).
const PRICE_KEYS: &[&str] = &["price", "prijs", "tarief"];

/// Accepted timestamp layouts without an explicit offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Accepted timestamp layouts carrying an explicit offset besides RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z"];

/// Hourly prices (€/kWh) keyed by unique timestamp, ordered in time.
///
/// Inserting a timestamp that is already present replaces its price, so a
/// series never holds duplicates. Negative prices are kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: BTreeMap<DateTime<FixedOffset>, f64>,
}

/// Outcome of parsing one or more price sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPrices {
    /// Valid rows, deduplicated by timestamp.
    pub series: PriceSeries,
    /// Number of data rows that were dropped because they did not parse.
    pub skipped_rows: usize,
}

impl PriceSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from `(timestamp, price)` pairs; later pairs win.
    pub fn from_points(points: impl IntoIterator<Item = (DateTime<FixedOffset>, f64)>) -> Self {
        let mut series = Self::new();
        for (ts, price) in points {
            series.insert(ts, price);
        }
        series
    }

    /// Parses delimiter-separated text with a header row.
    ///
    /// The delimiter is sniffed from the header (`;`, tab, then `,`). The
    /// timestamp column is the first whose name contains "timestamp", "time"
    /// or "datetime"; the price column the first containing "price", "prijs"
    /// or "tarief". Rows whose timestamp or price does not parse are skipped
    /// with a warning. Blank input yields an empty series.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::CsvData`] when the header lacks a recognizable
    /// timestamp or price column.
    pub fn parse(raw: &str) -> Result<ParsedPrices> {
        let text = raw.trim_start_matches('\u{feff}');
        let Some(header_line) = text.lines().find(|l| !l.trim().is_empty()) else {
            debug!("price source is empty");
            return Ok(ParsedPrices::default());
        };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(sniff_delimiter(header_line))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| CalcError::CsvData(format!("unreadable header row: {e}")))?
            .clone();
        let (ts_col, price_col) = locate_columns(&headers)?;

        let mut series = Self::new();
        let mut skipped_rows = 0_usize;
        for (idx, record) in rdr.records().enumerate() {
            let row = idx + 2;
            let parsed = record.ok().and_then(|r| {
                let ts = r.get(ts_col).and_then(parse_timestamp)?;
                let price = r.get(price_col).and_then(parse_price)?;
                Some((ts, price))
            });
            match parsed {
                Some((ts, price)) => series.insert(ts, price),
                None => {
                    warn!(row, "skipping price row without a valid timestamp and price");
                    skipped_rows += 1;
                }
            }
        }

        if series.is_empty() {
            warn!(skipped_rows, "price source contained no valid rows");
        } else {
            debug!(hours = series.len(), skipped_rows, "parsed price source");
        }

        Ok(ParsedPrices {
            series,
            skipped_rows,
        })
    }

    /// Parses several sources and merges them; later sources win on
    /// duplicate timestamps.
    ///
    /// # Errors
    ///
    /// Propagates the first [`CalcError::CsvData`] raised by any source.
    pub fn parse_many(sources: &[&str]) -> Result<ParsedPrices> {
        let mut merged = ParsedPrices::default();
        for raw in sources {
            let parsed = Self::parse(raw)?;
            merged.series.merge(parsed.series);
            merged.skipped_rows += parsed.skipped_rows;
        }
        Ok(merged)
    }

    /// Inserts or replaces the price at `ts`.
    pub fn insert(&mut self, ts: DateTime<FixedOffset>, price: f64) {
        self.points.insert(ts, price);
    }

    /// Moves every point of `other` into `self`, replacing existing prices.
    pub fn merge(&mut self, other: PriceSeries) {
        self.points.extend(other.points);
    }

    /// Number of hourly points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over `(timestamp, price)` in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<FixedOffset>, f64)> + '_ {
        self.points.iter().map(|(ts, p)| (ts, *p))
    }

    /// Prices in chronological order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Earliest timestamp, if any.
    pub fn first_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.points.keys().next().copied()
    }

    /// Latest timestamp, if any.
    pub fn last_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.points.keys().next_back().copied()
    }

    /// Returns a new series with `f` applied to every price.
    pub fn map_prices(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            points: self.points.iter().map(|(ts, p)| (*ts, f(*p))).collect(),
        }
    }

    /// Prices grouped by calendar date (local to each timestamp's offset).
    pub fn days(&self) -> BTreeMap<NaiveDate, Vec<f64>> {
        let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for (ts, price) in &self.points {
            days.entry(ts.date_naive()).or_default().push(*price);
        }
        days
    }
}

/// Picks the delimiter from the header line.
fn sniff_delimiter(header: &str) -> u8 {
    if header.contains(';') {
        b';'
    } else if header.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

fn find_column(headers: &csv::StringRecord, keys: &[&str], skip: Option<usize>) -> Option<usize> {
    headers.iter().enumerate().find_map(|(i, name)| {
        let lower = name.to_lowercase();
        (Some(i) != skip && keys.iter().any(|k| lower.contains(k))).then_some(i)
    })
}

fn locate_columns(headers: &csv::StringRecord) -> Result<(usize, usize)> {
    let price_col = find_column(headers, PRICE_KEYS, None).ok_or_else(|| {
        CalcError::CsvData("no price column (price/prijs/tarief) in header".to_string())
    })?;
    let ts_col = find_column(headers, TIMESTAMP_KEYS, Some(price_col)).ok_or_else(|| {
        CalcError::CsvData("no timestamp column (timestamp/time/datetime) in header".to_string())
    })?;
    Ok((ts_col, price_col))
}

/// Parses an ISO-8601 instant; timestamps without offset are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parses a price, accepting `,` as decimal separator and a leading `€`.
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('€').trim().replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}
