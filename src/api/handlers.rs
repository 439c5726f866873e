//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::AppState;
use super::types::{
    AnnualCostRequest, BatteryRequest, CompareRequest, ErrorResponse, PriceSummaryRequest,
    PriceSummaryResponse, parse_sources,
};
use crate::battery::{BatteryScenarios, compute_scenarios};
use crate::cost::{AnnualCost, ContractComparison, CostMode, compare_contracts, compute_annual_cost};
use crate::error::CalcError;
use crate::prices::{PriceSeries, summarize};

/// A [`CalcError`] rendered as JSON: 400 for input errors, 500 otherwise.
#[derive(Debug)]
pub struct ApiError(CalcError);

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_recoverable() {
            StatusCode::BAD_REQUEST
        } else {
            warn!(error = %self.0, "calculation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Parses a price CSV and returns grouped statistics.
///
/// `POST /prices/summary` → 200 + `PriceSummaryResponse` JSON
pub async fn summarize_prices(Json(req): Json<PriceSummaryRequest>) -> ApiResult<PriceSummaryResponse> {
    let parsed = PriceSeries::parse(&req.csv)?;
    let series = &parsed.series;
    Ok(Json(PriceSummaryResponse {
        hours: series.len(),
        skipped_rows: parsed.skipped_rows,
        first: series.first_timestamp().map(|t| t.to_rfc3339()),
        last: series.last_timestamp().map(|t| t.to_rfc3339()),
        groups: summarize(series).rows(),
    }))
}

/// Computes the deterministic or Monte Carlo annual cost.
///
/// `POST /annual-cost` → 200 + `AnnualCost` JSON
/// Monte Carlo runs on the blocking pool; iterations above
/// `AppState::max_iterations` → 400 range error.
pub async fn annual_cost(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnualCostRequest>,
) -> ApiResult<AnnualCost> {
    if let Some(options) = &req.monte_carlo {
        if options.iterations > state.max_iterations {
            return Err(CalcError::range(
                "mc_iterations",
                1.0,
                state.max_iterations as f64,
                options.iterations as f64,
            )
            .into());
        }
    }

    let series = parse_sources(&req.csv)?;
    let load = req.load.into_load(&series)?;
    let fixed_costs = req.fixed_costs;

    let cost = match req.monte_carlo {
        None => compute_annual_cost(&series, &load, fixed_costs, CostMode::Deterministic)?,
        Some(options) => tokio::task::spawn_blocking(move || {
            compute_annual_cost(&series, &load, fixed_costs, CostMode::MonteCarlo(options))
        })
        .await
        .map_err(|e| CalcError::Calculation(format!("monte carlo worker failed: {e}")))??,
    };
    Ok(Json(cost))
}

/// Compares a fixed and a dynamic contract over the same load.
///
/// `POST /contracts/compare` → 200 + `ContractComparison` JSON
pub async fn compare(Json(req): Json<CompareRequest>) -> ApiResult<ContractComparison> {
    let series = parse_sources(&req.csv)?;
    let load = req.load.into_load(&series)?;
    let comparison = compare_contracts(&series, &load, &req.fixed, &req.dynamic, req.fixed_costs)?;
    Ok(Json(comparison))
}

/// Computes the three battery payback scenarios.
///
/// `POST /battery` → 200 + `BatteryScenarios` JSON
pub async fn battery(Json(req): Json<BatteryRequest>) -> ApiResult<BatteryScenarios> {
    let series = req.csv.as_deref().map(parse_sources).transpose()?;
    let scenarios = compute_scenarios(&req.input, series.as_ref())?;
    Ok(Json(scenarios))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;

    fn day_csv() -> String {
        let mut csv = String::from("timestamp,price\n");
        for hour in 0..24 {
            let price = if (17..21).contains(&hour) { 0.35 } else { 0.10 };
            csv.push_str(&format!("2024-11-05T{hour:02}:00:00Z,{price}\n"));
        }
        csv
    }

    async fn post(path: &str, body: Value) -> (StatusCode, Value) {
        let app = router(Arc::new(AppState::default()));
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn summary_returns_groups() {
        let (status, json) = post("/prices/summary", json!({ "csv": day_csv() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hours"], 24);
        assert_eq!(json["skippedRows"], 0);
        assert!(json["groups"].as_array().is_some_and(|g| !g.is_empty()));
    }

    #[tokio::test]
    async fn empty_csv_is_500_with_generic_message() {
        let (status, json) = post(
            "/annual-cost",
            json!({ "csv": ["", ""], "load": { "flat": 1.0 }, "fixedCosts": 0.0 }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "calculation");
        assert!(json["message"].as_str().is_some_and(|m| m.contains("later")));
    }

    #[tokio::test]
    async fn monte_carlo_over_limit_is_range_error() {
        let (status, json) = post(
            "/annual-cost",
            json!({
                "csv": [day_csv()],
                "load": { "flat": 1.0 },
                "monteCarlo": { "iterations": 10_000_000, "blockDays": 1, "seed": 1 }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "range");
    }

    #[tokio::test]
    async fn monte_carlo_returns_distribution() {
        let (status, json) = post(
            "/annual-cost",
            json!({
                "csv": [day_csv()],
                "load": { "flat": 1.0 },
                "fixedCosts": 50.0,
                "monteCarlo": { "iterations": 20, "blockDays": 1, "seed": 3 }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["mode"], "risk");
        assert!(json["P10"].as_f64() <= json["P90"].as_f64());
    }

    #[tokio::test]
    async fn compare_picks_cheaper_contract() {
        let (status, json) = post(
            "/contracts/compare",
            json!({
                "csv": [day_csv()],
                "load": { "flat": 1.0 },
                "fixed": { "pricePerKwh": 0.40 },
                "dynamic": { "markupPerKwh": 0.10 }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cheaper"], "dynamisch");
    }

    #[tokio::test]
    async fn battery_rejects_small_capacity() {
        let (status, json) = post(
            "/battery",
            json!({
                "battery": {
                    "capacityKwh": 2.0, "priceEuro": 3000.0, "roundTripEfficiency": 0.9,
                    "warrantyYears": 10, "degradationPerYear": 0.02
                },
                "annualConsumptionKwh": 3500.0,
                "importPricePerKwh": 0.3,
                "contract": { "type": "vast", "pricePerKwh": 0.3 }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "range");
    }
}
