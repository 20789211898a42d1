//! Login endpoint handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::error_response;
use crate::mock_server::state::MockState;

/// Body of `POST /auth`.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

/// POST /auth
pub async fn login(
    State(state): State<Arc<RwLock<MockState>>>,
    Json(params): Json<LoginParams>,
) -> impl IntoResponse {
    let state = state.read().await;

    match state.login(&params.email, &params.password) {
        Some(token) => (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response(),
        None => error_response(StatusCode::UNAUTHORIZED, "invalid credentials"),
    }
}
