mod common;

use axum::http::StatusCode;
use common::{reference_document, simple_document, TestApp};
use serde_json::json;

/// Opening 100, a sale before the window, then a month of activity.
async fn seeded_app() -> (TestApp, String) {
    let app = TestApp::spawn();
    let account_id = app.create_account("Ravi Traders", "100").await;

    app.create_document("sales", simple_document("2024-04-10", "Ravi Traders", "10", "50"))
        .await;
    app.create_document("sales", reference_document("2024-05-05", "Ravi Traders"))
        .await;
    app.create_document(
        "purchases",
        simple_document("2024-05-12", "ravi traders", "2", "100"),
    )
    .await;
    app.create_document(
        "estimates",
        simple_document("2024-05-15", "Ravi Traders", "1", "999"),
    )
    .await;
    app.create_document("sales", simple_document("2024-05-18", "Sri Granites", "1", "70"))
        .await;

    let day_book = app
        .post(
            "/day-books",
            json!({
                "date": "2024-05-20",
                "received": [
                    { "account_name": "Ravi Traders", "amount": "300" },
                    { "account_name": "Cash sale", "amount": "100" }
                ],
                "payments": [{ "account_name": "Ravi Traders", "amount": "50" }]
            }),
        )
        .await;
    assert_eq!(day_book.status, StatusCode::CREATED);

    app.create_document("sales", simple_document("2024-06-02", "Ravi Traders", "1", "40"))
        .await;

    (app, account_id)
}

#[tokio::test]
async fn report_rolls_earlier_activity_into_opening_balance() {
    let (app, account_id) = seeded_app().await;

    let response = app
        .get(&format!(
            "/ledger-report?account={}&from=2024-05-01&to=2024-05-31",
            account_id
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let report = &response.body;
    assert_eq!(report["account_name"], "Ravi Traders");
    assert_eq!(report["opening_balance"], "600.00");
    assert_eq!(report["total_debit"], "665.00");
    assert_eq!(report["total_credit"], "700.00");
    assert_eq!(report["closing_balance"], "565.00");

    let lines = report["lines"].as_array().unwrap();
    let sources: Vec<&str> = lines
        .iter()
        .map(|l| l["source"].as_str().unwrap())
        .collect();
    assert_eq!(
        sources,
        vec!["sale", "sale_advance", "purchase", "cash_received", "cash_paid"]
    );
    let running: Vec<&str> = lines
        .iter()
        .map(|l| l["running_balance"].as_str().unwrap())
        .collect();
    assert_eq!(running, vec!["1215.00", "1015.00", "815.00", "515.00", "565.00"]);
    assert_eq!(lines[0]["document_number"], 2);
}

#[tokio::test]
async fn report_accepts_account_name() {
    let (app, _) = seeded_app().await;

    let response = app
        .get("/ledger-report?account=ravi%20traders&from=2024-05-01&to=2024-05-31")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["closing_balance"], "565.00");
}

#[tokio::test]
async fn report_window_end_excludes_later_activity() {
    let (app, account_id) = seeded_app().await;

    let response = app
        .get(&format!(
            "/ledger-report?account={}&from=2024-04-01&to=2024-06-30",
            account_id
        ))
        .await;

    assert_eq!(response.body["opening_balance"], "100.00");
    assert_eq!(response.body["closing_balance"], "605.00");
    assert_eq!(response.body["lines"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let app = TestApp::spawn();

    let response = app.get("/ledger-report?account=Nobody").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let app = TestApp::spawn();
    app.create_account("Ravi Traders", "0").await;

    let response = app
        .get("/ledger-report?account=Ravi%20Traders&from=2024-06-01&to=2024-05-01")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
