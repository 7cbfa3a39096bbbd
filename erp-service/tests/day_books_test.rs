mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

fn day_book(date: &str) -> Value {
    json!({
        "date": date,
        "narration": "Counter cash",
        "received": [
            { "account_name": "Ravi Traders", "amount": "300" },
            { "account_name": "Cash sale", "amount": "100", "particulars": "Tiles 2x2" }
        ],
        "payments": [
            { "account_name": "Ravi Traders", "amount": "50" }
        ]
    })
}

#[tokio::test]
async fn create_day_book_computes_totals() {
    let app = TestApp::spawn();

    let response = app.post("/day-books", day_book("2024-05-20")).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["year"], "2024-25");
    assert_eq!(response.body["received_total"], "400.00");
    assert_eq!(response.body["payment_total"], "50.00");
    assert_eq!(response.body["balance"], "350.00");
    assert_eq!(response.body["received"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["received"][1]["particulars"], "Tiles 2x2");
    assert_eq!(response.body["payments"][0]["amount"], "50.00");
}

#[tokio::test]
async fn one_day_book_per_date() {
    let app = TestApp::spawn();
    app.post("/day-books", day_book("2024-05-20")).await;

    let response = app.post("/day-books", day_book("2024-05-20")).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn empty_day_book_is_rejected() {
    let app = TestApp::spawn();

    let response = app.post("/day-books", json!({ "date": "2024-05-20" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn entry_without_account_is_rejected() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/day-books",
            json!({
                "date": "2024-05-20",
                "received": [{ "account_name": " ", "amount": "10" }]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_replaces_entries() {
    let app = TestApp::spawn();
    let created = app.post("/day-books", day_book("2024-05-20")).await;
    let id = created.body["day_book_id"].as_str().unwrap();

    let response = app
        .put(
            &format!("/day-books/{}", id),
            json!({
                "date": "2024-05-21",
                "payments": [{ "account_name": "Kaveri Tiles", "amount": "75.5" }]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["date"], "2024-05-21");
    assert_eq!(response.body["received_total"], "0.00");
    assert_eq!(response.body["balance"], "-75.50");

    // The old date is free again.
    let again = app.post("/day-books", day_book("2024-05-20")).await;
    assert_eq!(again.status, StatusCode::CREATED);
}

#[tokio::test]
async fn missing_day_book_is_not_found() {
    let app = TestApp::spawn();

    let response = app
        .get("/day-books/00000000-0000-0000-0000-000000000000")
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_by_date_range() {
    let app = TestApp::spawn();
    for date in ["2024-05-01", "2024-05-15", "2024-06-01"] {
        app.post("/day-books", day_book(date)).await;
    }

    let response = app.get("/day-books?from=2024-05-01&to=2024-05-31").await;

    let dates: Vec<&str> = response.body["day_books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-05-01", "2024-05-15"]);
}

#[tokio::test]
async fn calendar_lists_days_with_entries() {
    let app = TestApp::spawn();
    for date in ["2024-04-30", "2024-05-03", "2024-05-31", "2024-06-01"] {
        app.post("/day-books", day_book(date)).await;
    }

    let response = app.get("/day-books/calendar?month=2024-05").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["month"], "2024-05");
    let days = response.body["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2024-05-03");
    assert_eq!(days[1]["date"], "2024-05-31");
    assert_eq!(days[1]["balance"], "350.00");
}

#[tokio::test]
async fn calendar_rejects_bad_month() {
    let app = TestApp::spawn();

    let response = app.get("/day-books/calendar?month=2024-13").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preview_edits_each_side_independently() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/day-books/preview",
            json!({
                "received": [{ "account_name": "Ravi Traders", "amount": "300" }],
                "payments": [{ "account_name": "Ravi Traders", "amount": "50" }],
                "operations": [
                    { "op": "edit", "side": "payment", "index": 0, "field": "amount", "value": "80" },
                    { "op": "add", "side": "received", "account_name": "Cash sale", "amount": "20" }
                ]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["received_total"], "320.00");
    assert_eq!(response.body["payment_total"], "80.00");
    assert_eq!(response.body["balance"], "240.00");
}

#[tokio::test]
async fn preview_refuses_to_empty_a_side() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/day-books/preview",
            json!({
                "received": [{ "account_name": "Ravi Traders", "amount": "300" }],
                "payments": [{ "account_name": "Ravi Traders", "amount": "50" }],
                "operations": [{ "op": "remove", "side": "payment", "index": 0 }]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_preview_gets_a_json_error() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/day-books/preview",
            json!({ "received": "not a list", "payments": [] }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Json parse error"));

    let response = app.post("/day-books/preview", json!(["received"])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}
