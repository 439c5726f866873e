//! API request and response types.
//!
//! Field names are camelCase; price data travels as raw CSV text.

use serde::{Deserialize, Serialize};

use crate::battery::BatteryInput;
use crate::contract::{DynamicTariff, FixedTariff};
use crate::cost::{Load, MonteCarloOptions};
use crate::error::{CalcError, Result};
use crate::prices::{GroupStatsRow, PriceSeries};
use crate::profile::HouseholdProfile;

/// Raw price CSV for `POST /prices/summary`.
#[derive(Debug, Deserialize)]
pub struct PriceSummaryRequest {
    pub csv: String,
}

/// Grouped statistics of an uploaded series.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummaryResponse {
    pub hours: usize,
    pub skipped_rows: usize,
    /// First timestamp, RFC 3339.
    pub first: Option<String>,
    /// Last timestamp, RFC 3339.
    pub last: Option<String>,
    pub groups: Vec<GroupStatsRow>,
}

/// How the consumption per priced hour is described.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadRequest {
    /// Same kWh every hour.
    Flat(f64),
    /// Explicit kWh per price point.
    Hourly(Vec<f64>),
    /// Derived from the household's consumption profile.
    Household(HouseholdProfile),
}

impl LoadRequest {
    /// Resolves the request against the parsed `series`.
    pub fn into_load(self, series: &PriceSeries) -> Result<Load> {
        match self {
            Self::Flat(kwh) => Ok(Load::Flat(kwh)),
            Self::Hourly(values) => Ok(Load::Hourly(values)),
            Self::Household(household) => Load::from_household(&household, series),
        }
    }
}

/// Body of `POST /annual-cost`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualCostRequest {
    /// One or more price CSV texts, merged in order.
    pub csv: Vec<String>,
    pub load: LoadRequest,
    #[serde(default)]
    pub fixed_costs: f64,
    /// Present to request a Monte Carlo distribution.
    #[serde(default)]
    pub monte_carlo: Option<MonteCarloOptions>,
}

/// Body of `POST /contracts/compare`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub csv: Vec<String>,
    pub load: LoadRequest,
    pub fixed: FixedTariff,
    pub dynamic: DynamicTariff,
    #[serde(default)]
    pub fixed_costs: f64,
}

/// Body of `POST /battery`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryRequest {
    #[serde(flatten)]
    pub input: BatteryInput,
    /// Price CSV texts; required for a dynamic contract.
    #[serde(default)]
    pub csv: Option<Vec<String>>,
}

/// Error body for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind.
    pub error: String,
    /// Localized message for the end user.
    pub message: String,
    /// Suggested recovery action.
    pub recovery: String,
}

impl From<&CalcError> for ErrorResponse {
    fn from(err: &CalcError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.user_message(),
            recovery: err.recovery_hint().to_string(),
        }
    }
}

/// Parses every CSV text into one merged series.
pub(crate) fn parse_sources(sources: &[String]) -> Result<PriceSeries> {
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    PriceSeries::parse_many(&refs).map(|parsed| parsed.series)
}
