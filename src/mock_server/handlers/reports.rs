//! Report job endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{check_token, error_response};
use crate::mock_server::state::MockState;
use crate::reporting::{REPORT, TRAFFIC_QUALITY_REPORTS};

/// POST /report
pub async fn run_report(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(payload): Json<Map<String, Value>>,
) -> impl IntoResponse {
    report_job(&state, REPORT, &headers, &payload).await
}

/// POST /traffic_quality_reports
pub async fn run_traffic_quality_report(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(payload): Json<Map<String, Value>>,
) -> impl IntoResponse {
    report_job(&state, TRAFFIC_QUALITY_REPORTS, &headers, &payload).await
}

async fn report_job(
    state: &RwLock<MockState>,
    endpoint: &str,
    headers: &HeaderMap,
    payload: &Map<String, Value>,
) -> axum::response::Response {
    let mut state = state.write().await;
    if let Err(rejection) = check_token(&state, headers) {
        return rejection;
    }

    if let Some(interval) = payload.get("interval").and_then(Value::as_str) {
        if !matches!(interval, "hour" | "day" | "cumulative") {
            return error_response(StatusCode::BAD_REQUEST, "invalid interval");
        }
    }

    match state.report(endpoint, payload) {
        Some(body) => (StatusCode::OK, Json(body)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "unknown report_id"),
    }
}
