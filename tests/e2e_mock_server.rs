//! E2E tests using the mock SpringServe server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use std::time::Duration;

use serde_json::json;
use springserve::mock_server::{Fixtures, MockServer, MockState};
use springserve::{PollConfig, QueryParams, ReportParams, SpringServeClient, SpringServeError};

fn fast_polls() -> PollConfig {
    PollConfig::default().with_interval(Duration::from_millis(10))
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    // Both servers should have different URLs
    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    // After shutdown, server should not respond
    let client = reqwest::Client::new();
    let result = client.get(format!("{}/health", url)).send().await;

    assert!(result.is_err());
}

// =============================================================================
// Resource Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_list_every_supply_tag() {
    let server = MockServer::start().await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();

    let mut tags = client
        .supply_tags()
        .get(None, &QueryParams::new())
        .await
        .unwrap()
        .into_collection()
        .unwrap();

    assert_eq!(tags.loaded_len(), 10);
    let all = tags.collect_all().await.unwrap();
    assert_eq!(all.len(), 25);
    assert_eq!(all[24].get("name").unwrap(), "Supply Tag 25");
    assert!(tags.is_exhausted());

    server.shutdown().await;
}

#[tokio::test]
async fn test_get_update_and_reread() {
    let server = MockServer::start().await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();
    let demand_tags = client.demand_tags();

    let mut tag = demand_tags
        .get(Some("2"), &QueryParams::new())
        .await
        .unwrap()
        .into_single()
        .unwrap();
    tag.set("rate", 3.75).unwrap();
    tag.set("name", "Remnant (updated)").unwrap();

    let saved = tag.save().await.unwrap().into_single().unwrap();
    assert!(saved.ok());
    assert_eq!(saved.get("rate").unwrap(), &json!(3.75));

    let reread = demand_tags
        .get(Some("2"), &QueryParams::new())
        .await
        .unwrap()
        .into_single()
        .unwrap();
    assert_eq!(reread.get("name").unwrap(), "Remnant (updated)");

    server.shutdown().await;
}

#[tokio::test]
async fn test_create_then_get() {
    let server = MockServer::start().await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();

    let created = client
        .domain_lists()
        .create(
            &json!({"name": "New List", "domains": ["new.example"]}),
            None,
            &QueryParams::new(),
        )
        .await
        .unwrap()
        .into_single()
        .unwrap();
    let id = created.id().unwrap();
    assert_eq!(id, "3");

    let fetched = client
        .domain_lists()
        .get(Some(&id), &QueryParams::new())
        .await
        .unwrap()
        .into_single()
        .unwrap();
    assert_eq!(fetched.get("domains").unwrap(), &json!(["new.example"]));

    server.shutdown().await;
}

#[tokio::test]
async fn test_missing_object_is_not_ok() {
    let server = MockServer::start().await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();

    let response = client
        .supply_tags()
        .get(Some("999"), &QueryParams::new())
        .await
        .unwrap();

    assert!(!response.ok());
    let object = response.into_single().unwrap();
    assert!(matches!(object.save().await, Err(SpringServeError::MissingId)));

    server.shutdown().await;
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_login_then_authorized_requests() {
    let state = MockState::new()
        .with_required_token("issued-token")
        .with_credentials("me@example.com", "hunter2")
        .with_resource("supply_tags", Fixtures::supply_tag(1, "Only Tag"));
    let server = MockServer::with_state(state).await;

    let wrong = SpringServeClient::new("wrong-token", server.url()).unwrap();
    let denied = wrong
        .supply_tags()
        .get(Some("1"), &QueryParams::new())
        .await
        .unwrap();
    assert!(!denied.ok());

    let client = SpringServeClient::login("me@example.com", "hunter2", server.url())
        .await
        .unwrap();
    let tag = client
        .supply_tags()
        .get(Some("1"), &QueryParams::new())
        .await
        .unwrap();
    assert!(tag.ok());

    server.shutdown().await;
}

// =============================================================================
// Reporting Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_report_polls_then_pages() {
    let server = MockServer::with_state(
        MockState::new()
            .with_report_rows(Fixtures::report_rows(23))
            .with_polls_before_complete(2),
    )
    .await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();

    let params = ReportParams::new()
        .start_date("2016-01-01")
        .end_date("2016-01-02")
        .interval("hour")
        .dimension("supply_tag_id");
    let mut report = client
        .reports()
        .with_poll_config(fast_polls())
        .run(&params)
        .await
        .unwrap();

    assert_eq!(report.to_dataframe().len(), 10);
    let frame = report.get_all_pages().await.unwrap();
    assert_eq!(frame.len(), 23);

    // submit, two polls, then pages 2, 3 and the empty page 4
    let state = server.state();
    let requests = state.read().await.report_requests.clone();
    assert_eq!(requests.len(), 6);
    assert!(requests[0].get("report_id").is_none());
    assert_eq!(requests[5]["page"], 4);
    assert_eq!(requests[5]["interval"], "hour");

    server.shutdown().await;
}

#[tokio::test]
async fn test_report_streams_rows_one_page_at_a_time() {
    use futures::TryStreamExt;

    let server = MockServer::with_state(
        MockState::new()
            .with_report_rows(Fixtures::report_rows(12))
            .with_polls_before_complete(0),
    )
    .await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();

    let mut report = client
        .traffic_quality_reports()
        .with_poll_config(fast_polls())
        .run(&ReportParams::new())
        .await
        .unwrap();

    let rows: Vec<_> = report.stream().try_collect().await.unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[11].get("date").unwrap(), "2016-01-01 11:00:00");

    server.shutdown().await;
}

#[tokio::test]
async fn test_invalid_interval_rejected_locally() {
    let server = MockServer::start().await;
    let client = SpringServeClient::new("test-token", server.url()).unwrap();

    let err = client
        .reports()
        .run(&ReportParams::new().interval("week"))
        .await
        .unwrap_err();
    assert!(matches!(err, SpringServeError::InvalidInterval(_)));

    assert!(server.state().read().await.report_requests.is_empty());

    server.shutdown().await;
}
