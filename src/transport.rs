//! The HTTP transport seam.
//!
//! Services never talk to reqwest directly; they go through [`Transport`],
//! which [`SpringServeClient`](crate::SpringServeClient) implements. Any
//! other implementation (a recording fake, a proxy) can be injected instead.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, SpringServeError};

/// A response as seen by the wrapper layer.
///
/// Non-2xx statuses are carried as data (`ok == false`) rather than errors.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    status: u16,
    ok: bool,
    json: Option<Value>,
}

impl RawResponse {
    /// Create a response from a status code and parsed body.
    #[must_use]
    pub fn new(status: u16, json: Option<Value>) -> Self {
        Self {
            status,
            ok: (200..300).contains(&status),
            json,
        }
    }

    /// Build a response from a status code and a raw body.
    ///
    /// An empty body yields no JSON. A body that fails to parse is an error
    /// for successful responses; for error statuses it is kept as a JSON
    /// string so the caller can still inspect it.
    pub fn from_body(status: u16, body: &str) -> Result<Self> {
        let mut response = Self::new(status, None);
        if body.trim().is_empty() {
            return Ok(response);
        }

        response.json = match serde_json::from_str(body) {
            Ok(json) => Some(json),
            Err(_) if !response.ok => Some(Value::String(body.to_string())),
            Err(e) => return Err(SpringServeError::ParseError(e)),
        };
        Ok(response)
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status was 2xx.
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// Parsed body, if there was one.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Take the parsed body, leaving `None` behind.
    pub fn take_json(&mut self) -> Option<Value> {
        self.json.take()
    }

    /// Turn a non-2xx response into [`SpringServeError::ApiError`].
    ///
    /// Used where there is no wrapper to carry the `ok` flag.
    pub fn error_for_status(self) -> Result<Self> {
        if self.ok {
            return Ok(self);
        }
        Err(SpringServeError::ApiError {
            message: self.error_message(),
            status_code: Some(self.status),
        })
    }

    fn error_message(&self) -> String {
        match &self.json {
            Some(Value::Object(map)) => ["message", "error", "errors"]
                .iter()
                .find_map(|key| map.get(*key))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => format!("HTTP {}", self.status),
        }
    }
}

/// Minimal HTTP surface the wrapper layer needs.
///
/// Paths are relative to the API root and already formatted with
/// [`format_url`](crate::format_url). Network failures are errors; HTTP
/// error statuses are not.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request.
    async fn get(&self, path: &str) -> Result<RawResponse>;

    /// Issue a PUT request with a JSON body.
    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse>;

    /// Issue a POST request with a JSON body.
    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_follows_status() {
        assert!(RawResponse::new(200, None).ok());
        assert!(RawResponse::new(204, None).ok());
        assert!(!RawResponse::new(404, None).ok());
        assert!(!RawResponse::new(500, None).ok());
    }

    #[test]
    fn test_empty_body_has_no_json() {
        let response = RawResponse::from_body(200, "  \n").unwrap();
        assert!(response.json().is_none());
    }

    #[test]
    fn test_malformed_success_body_is_an_error() {
        let result = RawResponse::from_body(200, "{not json");
        assert!(matches!(result, Err(SpringServeError::ParseError(_))));
    }

    #[test]
    fn test_malformed_error_body_is_kept() {
        let response = RawResponse::from_body(502, "<html>bad gateway</html>").unwrap();
        assert!(!response.ok());
        assert_eq!(response.json(), Some(&json!("<html>bad gateway</html>")));
    }

    #[test]
    fn test_error_for_status_uses_message() {
        let response = RawResponse::new(422, Some(json!({"error": "name is required"})));
        match response.error_for_status() {
            Err(SpringServeError::ApiError { message, status_code }) => {
                assert_eq!(message, "name is required");
                assert_eq!(status_code, Some(422));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }
}
