mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["service"], "erp-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn();

    let response = app.get("/ready").await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    let app = TestApp::spawn();
    app.get("/health").await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    let content_type = response
        .headers
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type");
    assert!(content_type.starts_with("text/plain"));
}

/// Every response carries a request id and the security headers.
#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn();

    let response = app.get("/health").await;

    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn fiscal_year_runs_april_to_march() {
    let app = TestApp::spawn();

    let response = app.get("/fiscal-year?date=2025-03-31").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["year"], "2024-25");
    assert_eq!(response.body["start_date"], "2024-04-01");
    assert_eq!(response.body["end_date"], "2025-03-31");

    let response = app.get("/fiscal-year?date=2025-04-01").await;
    assert_eq!(response.body["year"], "2025-26");

    let response = app.get("/fiscal-year").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["year"].as_str().is_some());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::spawn();

    let response = app.get("/invoices").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
