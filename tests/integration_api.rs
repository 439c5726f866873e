//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use tariff_sim::api::{AppState, router};

async fn post(state: AppState, path: &str, body: Value) -> (StatusCode, Value) {
    let app = router(Arc::new(state));
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
    let json = serde_json::from_slice(&bytes).expect("response body should be JSON");
    (status, json)
}

#[tokio::test]
async fn summary_reports_skipped_rows_and_range() {
    let csv = format!("{}not-a-date;0,10\n", common::winter_csv_semicolon(2));
    let (status, json) = post(AppState::default(), "/prices/summary", json!({ "csv": csv })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hours"], 48);
    assert_eq!(json["skippedRows"], 1);
    assert_eq!(json["first"], "2025-01-01T00:00:00+01:00");
}

#[tokio::test]
async fn deterministic_cost_for_household_load() {
    let (status, json) = post(
        AppState::default(),
        "/annual-cost",
        json!({
            "csv": [common::winter_csv(7)],
            "load": { "household": {
                "annualKwh": 6500.0, "heatingType": "all-electric", "buildYear": 2012, "persons": 4
            }},
            "fixedCosts": 120.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "deterministic");
    assert_eq!(json["hours"], 168);
    assert!(json["totalCost"].as_f64().is_some_and(|t| t > 120.0));
}

#[tokio::test]
async fn state_limits_monte_carlo_iterations() {
    let state = AppState { max_iterations: 50 };
    let (status, json) = post(
        state,
        "/annual-cost",
        json!({
            "csv": [common::winter_csv(7)],
            "load": { "flat": 0.5 },
            "monteCarlo": { "iterations": 51, "blockDays": 1, "seed": 1 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "range");
    assert!(json["recovery"].as_str().is_some_and(|r| !r.is_empty()));
}

#[tokio::test]
async fn hourly_load_length_mismatch_is_bad_request() {
    let (status, json) = post(
        AppState::default(),
        "/annual-cost",
        json!({ "csv": [common::winter_csv(1)], "load": { "hourly": [1.0, 2.0] } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_input");
}

#[tokio::test]
async fn dynamic_battery_without_prices_is_missing_data() {
    let (status, json) = post(
        AppState::default(),
        "/battery",
        json!({
            "battery": {
                "capacityKwh": 10.0, "priceEuro": 6000.0, "roundTripEfficiency": 0.9,
                "warrantyYears": 10, "degradationPerYear": 0.02
            },
            "annualConsumptionKwh": 3500.0,
            "importPricePerKwh": 0.3,
            "contract": { "type": "dynamisch", "markupPerKwh": 0.15 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "missing_data");
}

#[tokio::test]
async fn dynamic_battery_with_prices_returns_three_scenarios() {
    let (status, json) = post(
        AppState::default(),
        "/battery",
        json!({
            "battery": {
                "capacityKwh": 10.0, "priceEuro": 6000.0, "roundTripEfficiency": 0.9,
                "warrantyYears": 10, "degradationPerYear": 0.02
            },
            "annualConsumptionKwh": 3500.0,
            "solarProductionKwh": 4000.0,
            "selfConsumptionWithoutPct": 30.0,
            "selfConsumptionWithPct": 60.0,
            "importPricePerKwh": 0.3,
            "feedInTariffPerKwh": 0.05,
            "feedInCostPerKwh": 0.11,
            "contract": { "type": "dynamisch", "markupPerKwh": 0.15 },
            "csv": [common::winter_csv(7)]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for name in ["huidig", "na2027", "dynamischOptimaal"] {
        let flow = json[name]["cumulativeCashFlow"].as_array().unwrap();
        assert_eq!(flow.len(), 15, "{name}");
        assert_eq!(flow[0].as_f64(), Some(-6000.0), "{name}");
    }
    assert!(json["arbitrageStats"].is_object());
    assert!(json["eigenverbruikImpact"].is_object());
}
