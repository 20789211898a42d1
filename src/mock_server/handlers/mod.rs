//! HTTP request handlers for the mock server.

pub mod auth;
pub mod reports;
pub mod resources;

pub use auth::*;
pub use reports::*;
pub use resources::*;

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::state::MockState;

/// Reject the request unless it carries the required token.
fn check_token(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if state.is_authorized(token) {
        Ok(())
    } else {
        Err(error_response(StatusCode::UNAUTHORIZED, "invalid or missing token"))
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
