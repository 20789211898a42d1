//! Generic resource endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{check_token, error_response};
use crate::mock_server::state::MockState;

/// Query parameters for listing resources.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
}

/// GET /{resource}
pub async fn list_resources(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(resource): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let state = state.read().await;
    if let Err(rejection) = check_token(&state, &headers) {
        return rejection;
    }

    let page = query.page.unwrap_or(1);
    (StatusCode::OK, Json(state.list_page(&resource, page))).into_response()
}

/// GET /{resource}/{id}
pub async fn get_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let state = state.read().await;
    if let Err(rejection) = check_token(&state, &headers) {
        return rejection;
    }

    match state.get_resource(&resource, &id) {
        Some(object) => (StatusCode::OK, Json(object.clone())).into_response(),
        None => not_found(&resource, &id),
    }
}

/// PUT /{resource}/{id}
pub async fn update_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.write().await;
    if let Err(rejection) = check_token(&state, &headers) {
        return rejection;
    }

    match state.update_resource(&resource, &id, body) {
        Some(object) => (StatusCode::OK, Json(object.clone())).into_response(),
        None => not_found(&resource, &id),
    }
}

/// POST /{resource}
pub async fn create_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.write().await;
    if let Err(rejection) = check_token(&state, &headers) {
        return rejection;
    }

    match body {
        Value::Object(fields) => {
            (StatusCode::CREATED, Json(state.create_resource(&resource, fields))).into_response()
        }
        _ => error_response(StatusCode::BAD_REQUEST, "expected a JSON object"),
    }
}

fn not_found(resource: &str, id: &str) -> axum::response::Response {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("No object in {resource} with id: {id}"),
    )
}
