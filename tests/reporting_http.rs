//! Report job tests against a wiremock SpringServe API.

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use springserve::{PollConfig, ReportCollection, ReportParams, SpringServeClient, SpringServeError};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rows(count: u64) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({"supply_tag_id": i, "total_impressions": i * 100}))
            .collect(),
    )
}

#[tokio::test]
async fn test_pending_then_complete() {
    let mock_server = MockServer::start().await;

    // Polls carry the report_id; the first submission does not.
    Mock::given(method("POST"))
        .and(path("/report"))
        .and(body_partial_json(json!({"report_id": 31})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "report_id": 31,
            "status": "COMPLETE",
            "data": rows(5)
        })))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .and(body_partial_json(json!({
            "start_date": "2016-01-01",
            "end_date": "2016-01-02",
            "interval": "day",
            "dimensions": ["supply_tag_id"],
            "report_service": true,
            "async": true
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"report_id": 31, "status": "PENDING"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SpringServeClient::new("test-token", &mock_server.uri()).unwrap();
    let params = ReportParams::new()
        .start_date("2016-01-01")
        .end_date("2016-01-02")
        .interval("day")
        .dimension("supply_tag_id");

    let started = Instant::now();
    let mut report = client.reports().run(&params).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(report.status(), Some("COMPLETE"));
    assert_eq!(report.to_dataframe().len(), 5);
    assert_eq!(report.to_dataframe().column("supply_tag_id")[4], &json!(4));
}

#[tokio::test]
async fn test_invalid_interval_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = SpringServeClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .reports()
        .run(&ReportParams::new().interval("week"))
        .await
        .unwrap_err();

    assert!(matches!(err, SpringServeError::InvalidInterval(ref s) if s == "week"));
}

#[tokio::test]
async fn test_next_page_without_payload_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = SpringServeClient::new("test-token", &mock_server.uri()).unwrap();
    let mut report = ReportCollection::new(
        client.reports().service().clone(),
        json!({"report_id": 1, "status": "COMPLETE", "data": rows(2)}),
        None,
    );

    let err = report.get_next_page(true).await.unwrap_err();
    assert!(matches!(err, SpringServeError::ConfigMissing(_)));
    assert_eq!(report.to_dataframe().len(), 2);
}

#[tokio::test]
async fn test_all_pages_of_traffic_quality_report() {
    let mock_server = MockServer::start().await;

    for (page, body) in [(2, rows(3)), (3, json!([]))] {
        Mock::given(method("POST"))
            .and(path("/traffic_quality_reports"))
            .and(body_partial_json(json!({"report_id": "tq-1", "page": page})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "report_id": "tq-1",
                "status": "COMPLETE",
                "data": body
            })))
            .with_priority(1)
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/traffic_quality_reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "report_id": "tq-1",
            "status": "COMPLETE",
            "data": rows(10)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SpringServeClient::new("test-token", &mock_server.uri()).unwrap();
    let mut report = client
        .traffic_quality_reports()
        .run(&ReportParams::new().interval("cumulative"))
        .await
        .unwrap();

    let frame = report.get_all_pages().await.unwrap();
    assert_eq!(frame.len(), 13);
    assert!(report.is_exhausted());
}

#[tokio::test]
async fn test_poll_limit_is_enforced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"report_id": 8, "status": "PENDING"})),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = SpringServeClient::new("test-token", &mock_server.uri()).unwrap();
    let poll = PollConfig::default()
        .with_interval(Duration::from_millis(10))
        .with_max_attempts(2);

    let err = client
        .reports()
        .with_poll_config(poll)
        .run(&ReportParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SpringServeError::PollLimitExceeded { attempts: 2, .. }));
}

#[tokio::test]
async fn test_malformed_response_names_missing_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
        .mount(&mock_server)
        .await;

    let client = SpringServeClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client.reports().run(&ReportParams::new()).await.unwrap_err();

    assert!(matches!(err, SpringServeError::MissingField { field: "report_id", .. }));
}
