//! Mock server state management.
//!
//! Provides the in-memory data store for the mock SpringServe API server.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

/// Items per page of a resource listing.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A submitted report job.
#[derive(Debug, Clone)]
pub struct ReportJob {
    /// Endpoint the job was submitted to.
    pub endpoint: String,
    /// Polls left before the job reports `COMPLETE`.
    pub polls_remaining: u32,
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// Objects per endpoint (e.g., "supply_tags"), in listing order.
    pub resources: HashMap<String, Vec<Value>>,

    /// Page size for resource listings and report data.
    pub page_size: usize,

    /// Rows every report job returns once complete.
    pub report_rows: Vec<Value>,

    /// How many polls a new job needs before it completes.
    pub polls_before_complete: u32,

    /// Submitted jobs by report ID.
    pub jobs: HashMap<u64, ReportJob>,

    /// Every report submission and poll, as received.
    pub report_requests: Vec<Value>,

    /// Optional authentication token. If set, requests must include this token.
    pub required_token: Option<String>,

    /// Accepted `(email, password)` for `POST /auth`.
    pub credentials: Option<(String, String)>,

    next_report_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            report_rows: Vec::new(),
            polls_before_complete: 1,
            jobs: HashMap::new(),
            report_requests: Vec::new(),
            required_token: None,
            credentials: None,
            next_report_id: 1,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add one object under an endpoint.
    pub fn with_resource(mut self, endpoint: &str, object: Value) -> Self {
        self.resources
            .entry(endpoint.to_string())
            .or_default()
            .push(object);
        self
    }

    /// Add several objects under an endpoint.
    pub fn with_resources(mut self, endpoint: &str, objects: Vec<Value>) -> Self {
        self.resources
            .entry(endpoint.to_string())
            .or_default()
            .extend(objects);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Rows returned by completed report jobs.
    pub fn with_report_rows(mut self, rows: Vec<Value>) -> Self {
        self.report_rows = rows;
        self
    }

    pub fn with_polls_before_complete(mut self, polls: u32) -> Self {
        self.polls_before_complete = polls;
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Accept these credentials on `POST /auth`; the token handed out is
    /// the required token, or `"mock-token"` if none is set.
    pub fn with_credentials(mut self, email: &str, password: &str) -> Self {
        self.credentials = Some((email.to_string(), password.to_string()));
        self
    }

    /// Whether an `Authorization` header value is accepted.
    pub fn is_authorized(&self, token: Option<&str>) -> bool {
        match &self.required_token {
            Some(required) => token == Some(required.as_str()),
            None => true,
        }
    }

    /// The token for a login, if the credentials match.
    pub fn login(&self, email: &str, password: &str) -> Option<String> {
        let (expected_email, expected_password) = self.credentials.as_ref()?;
        if email != expected_email || password != expected_password {
            return None;
        }
        Some(
            self.required_token
                .clone()
                .unwrap_or_else(|| "mock-token".to_string()),
        )
    }

    /// One page of an endpoint's objects; empty past the end.
    pub fn list_page(&self, endpoint: &str, page: usize) -> Vec<Value> {
        let all = self.resources.get(endpoint).map(Vec::as_slice).unwrap_or(&[]);
        page_of(all, page, self.page_size)
    }

    /// Get an object by ID.
    pub fn get_resource(&self, endpoint: &str, id: &str) -> Option<&Value> {
        self.resources
            .get(endpoint)?
            .iter()
            .find(|object| id_matches(object, id))
    }

    /// Replace an object's fields with `body` and return the stored version.
    ///
    /// The stored `id` is kept even if the body changes it.
    pub fn update_resource(&mut self, endpoint: &str, id: &str, body: Value) -> Option<&Value> {
        let object = self
            .resources
            .get_mut(endpoint)?
            .iter_mut()
            .find(|object| id_matches(object, id))?;

        if let (Value::Object(stored), Value::Object(fields)) = (&mut *object, body) {
            let stored_id = stored.get("id").cloned();
            stored.extend(fields);
            if let Some(stored_id) = stored_id {
                stored.insert("id".to_string(), stored_id);
            }
        }
        Some(&*object)
    }

    /// Store a new object with the next numeric ID.
    pub fn create_resource(&mut self, endpoint: &str, body: Map<String, Value>) -> Value {
        let objects = self.resources.entry(endpoint.to_string()).or_default();
        let next_id = objects
            .iter()
            .filter_map(|o| o.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0)
            + 1;

        let mut object = body;
        object.insert("id".to_string(), json!(next_id));
        let object = Value::Object(object);
        objects.push(object.clone());
        object
    }

    /// Handle one report POST.
    ///
    /// A payload without `report_id` submits a new job. A payload with one
    /// polls that job: each poll brings it one step closer to `COMPLETE`,
    /// after which `page` selects the slice of rows returned in `data`.
    /// Returns `None` for an unknown report ID.
    pub fn report(&mut self, endpoint: &str, payload: &Map<String, Value>) -> Option<Value> {
        self.report_requests.push(Value::Object(payload.clone()));

        let report_id = match payload.get("report_id") {
            Some(id) => id.as_u64().or_else(|| id.as_str()?.parse().ok())?,
            None => {
                let id = self.next_report_id;
                self.next_report_id += 1;
                self.jobs.insert(
                    id,
                    ReportJob {
                        endpoint: endpoint.to_string(),
                        polls_remaining: self.polls_before_complete,
                    },
                );
                id
            }
        };

        let is_new = !payload.contains_key("report_id");
        let job = self.jobs.get_mut(&report_id)?;
        if job.endpoint != endpoint {
            return None;
        }
        if !is_new && job.polls_remaining > 0 {
            job.polls_remaining -= 1;
        }
        if job.polls_remaining > 0 {
            let status = if is_new { "QUEUED" } else { "PENDING" };
            return Some(json!({ "report_id": report_id, "status": status }));
        }

        let page = payload
            .get("page")
            .and_then(Value::as_u64)
            .map_or(1, |p| p as usize);
        Some(json!({
            "report_id": report_id,
            "status": "COMPLETE",
            "data": page_of(&self.report_rows, page, self.page_size),
        }))
    }
}

fn page_of(items: &[Value], page: usize, page_size: usize) -> Vec<Value> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    items.iter().skip(start).take(page_size).cloned().collect()
}

fn id_matches(object: &Value, id: &str) -> bool {
    match object.get("id") {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}
