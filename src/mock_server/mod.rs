//! Mock SpringServe API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the SpringServe
//! API for integration and end-to-end testing. Unlike wiremock which mocks at
//! the HTTP level per-test, this server maintains state across requests: saved
//! objects stay saved, listings are paged, and report jobs move from `QUEUED`
//! to `COMPLETE` as they are polled.
//!
//! # Example
//!
//! ```ignore
//! use springserve::mock_server::MockServer;
//! use springserve::{QueryParams, SpringServeClient};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = SpringServeClient::new("test-token", server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let tags = client.supply_tags().get(None, &QueryParams::new()).await.unwrap();
//!     assert!(tags.is_collection());
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, ReportJob, DEFAULT_PAGE_SIZE};
