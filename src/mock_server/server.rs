//! Mock SpringServe API server.
//!
//! Provides an axum-based HTTP server that simulates the SpringServe API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// A mock SpringServe API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating a `SpringServeClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().with_report_rows(scenario.report_rows);
        for (endpoint, objects) in scenario.resources {
            state = state.with_resources(endpoint, objects);
        }
        state
    }

    /// Create the axum router with all routes.
    ///
    /// Static routes win over the `:resource` captures, so reports and login
    /// never reach the generic handlers.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Login
            .route("/auth", post(handlers::login))
            // Report jobs
            .route("/report", post(handlers::run_report))
            .route(
                "/traffic_quality_reports",
                post(handlers::run_traffic_quality_report),
            )
            // Health check
            .route("/health", get(health_check))
            // Generic resources
            .route(
                "/:resource",
                get(handlers::list_resources).post(handlers::create_resource),
            )
            .route(
                "/:resource/:id",
                get(handlers::get_resource).put(handlers::update_resource),
            )
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QueryParams, SpringServeClient};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_supply_tag_with_client() {
        let server = MockServer::start().await;
        let client = SpringServeClient::new("test-token", server.url()).unwrap();

        let tag = client
            .supply_tags()
            .get(Some("3"), &QueryParams::new())
            .await
            .expect("Failed to get supply tag")
            .into_single()
            .unwrap();

        assert_eq!(tag.get("name").unwrap(), "Supply Tag 3");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = SpringServeClient::new("test-token", server.url()).unwrap();

        let response = client
            .demand_tags()
            .get(Some("1"), &QueryParams::new())
            .await
            .unwrap();

        assert!(!response.ok());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new().with_resource(
            "domain_lists",
            Fixtures::domain_list(7, "My Custom List", &["example.net"]),
        );

        let server = MockServer::with_state(state).await;
        let client = SpringServeClient::new("test-token", server.url()).unwrap();

        let list = client
            .domain_lists()
            .get(Some("7"), &QueryParams::new())
            .await
            .unwrap()
            .into_single()
            .unwrap();

        assert_eq!(list.get("name").unwrap(), "My Custom List");

        server.shutdown().await;
    }
}
