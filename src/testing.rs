//! In-process transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::transport::{RawResponse, Transport};

/// One request seen by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Replays queued responses in order and records every request.
///
/// Once the queue is empty every request gets an empty 200.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    responses: Arc<Mutex<VecDeque<RawResponse>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingTransport {
    pub fn respond(&self, response: RawResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) -> RawResponse {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RawResponse::new(200, None))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        Ok(self.record("GET", path, None))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse> {
        Ok(self.record("PUT", path, Some(body)))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse> {
        Ok(self.record("POST", path, Some(body)))
    }
}
