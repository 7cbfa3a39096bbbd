mod common;

use axum::http::StatusCode;
use common::{reference_document, simple_document, TestApp};
use serde_json::json;

#[tokio::test]
async fn sale_totals_are_computed_on_the_server() {
    let app = TestApp::spawn();

    let sale = app
        .create_document("sales", reference_document("2024-05-05", "Ravi Traders"))
        .await;

    assert_eq!(sale["kind"], "sale");
    assert_eq!(sale["document_number"], 1);
    assert_eq!(sale["year"], "2024-25");
    assert_eq!(sale["lines"][0]["amount"], "500.00");
    assert_eq!(sale["lines"][1]["amount"], "100.00");
    assert_eq!(sale["line_total"], "600.00");
    assert_eq!(sale["charges_total"], "15.00");
    assert_eq!(sale["gross_total"], "615.00");
    assert_eq!(sale["advance"], "200.00");
    assert_eq!(sale["balance"], "415.00");
    assert_eq!(sale["vehicle_number"], "KA-01-1234");
}

#[tokio::test]
async fn client_supplied_amounts_are_ignored() {
    let app = TestApp::spawn();
    let mut body = simple_document("2024-05-05", "Ravi Traders", "3", "40");
    body["lines"][0]["amount"] = json!("9999");
    body["gross_total"] = json!("9999");

    let sale = app.create_document("sales", body).await;

    assert_eq!(sale["lines"][0]["amount"], "120.00");
    assert_eq!(sale["gross_total"], "120.00");
}

#[tokio::test]
async fn unparseable_numbers_count_as_zero() {
    let app = TestApp::spawn();
    let body = json!({
        "date": "2024-05-05",
        "party_name": "Walk-in",
        "lines": [{ "descriptor": "Tiles 2x2", "quantity": "abc", "rate": "45" }],
        "advance": ""
    });

    let sale = app.create_document("sales", body).await;

    assert_eq!(sale["lines"][0]["amount"], "0.00");
    assert_eq!(sale["balance"], "0.00");
}

#[tokio::test]
async fn numbering_is_per_kind() {
    let app = TestApp::spawn();

    let first = app
        .create_document("sales", simple_document("2024-05-01", "A", "1", "10"))
        .await;
    let second = app
        .create_document("sales", simple_document("2024-05-02", "B", "1", "10"))
        .await;
    let estimate = app
        .create_document("estimates", simple_document("2024-05-02", "B", "1", "10"))
        .await;
    let purchase = app
        .create_document("purchases", simple_document("2024-05-02", "C", "1", "10"))
        .await;

    assert_eq!(first["document_number"], 1);
    assert_eq!(second["document_number"], 2);
    assert_eq!(estimate["document_number"], 1);
    assert_eq!(estimate["kind"], "estimate");
    assert_eq!(purchase["document_number"], 1);
}

#[tokio::test]
async fn update_replaces_lines_and_keeps_number() {
    let app = TestApp::spawn();
    app.create_document("sales", simple_document("2024-05-01", "A", "1", "10"))
        .await;
    let sale = app
        .create_document("sales", reference_document("2024-05-05", "Ravi Traders"))
        .await;
    let id = sale["document_id"].as_str().unwrap();

    let response = app
        .put(
            &format!("/sales/{}", id),
            simple_document("2024-05-06", "Ravi Traders", "4", "25"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["document_number"], 2);
    assert_eq!(response.body["date"], "2024-05-06");
    assert_eq!(response.body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["gross_total"], "100.00");

    let fetched = app.get(&format!("/sales/{}", id)).await;
    assert_eq!(fetched.body["gross_total"], "100.00");
}

#[tokio::test]
async fn estimates_can_be_updated() {
    let app = TestApp::spawn();
    let estimate = app
        .create_document("estimates", simple_document("2024-05-01", "A", "1", "10"))
        .await;

    let response = app
        .put(
            &format!("/estimates/{}", estimate["document_id"].as_str().unwrap()),
            simple_document("2024-05-01", "A", "2", "10"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["gross_total"], "20.00");
}

#[tokio::test]
async fn document_without_lines_is_rejected() {
    let app = TestApp::spawn();
    let body = json!({ "date": "2024-05-05", "party_name": "Ravi Traders", "lines": [] });

    let response = app.post("/sales", body).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["fields"]["lines"].is_array());
}

#[tokio::test]
async fn document_without_date_is_rejected() {
    let app = TestApp::spawn();
    let mut body = simple_document("2024-05-05", "Ravi Traders", "1", "10");
    body.as_object_mut().unwrap().remove("date");

    let response = app.post("/purchases", body).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["fields"]["date"].is_array());
}

#[tokio::test]
async fn documents_are_scoped_to_their_kind() {
    let app = TestApp::spawn();
    let sale = app
        .create_document("sales", simple_document("2024-05-01", "A", "1", "10"))
        .await;
    let id = sale["document_id"].as_str().unwrap();

    let response = app.get(&format!("/purchases/{}", id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .put(
            &format!("/estimates/{}", id),
            simple_document("2024-05-01", "A", "1", "10"),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_party_newest_first() {
    let app = TestApp::spawn();
    for (date, party) in [
        ("2024-05-01", "Ravi Traders"),
        ("2024-05-09", "Sri Granites"),
        ("2024-05-07", "ravi traders"),
    ] {
        app.create_document("sales", simple_document(date, party, "1", "10"))
            .await;
    }

    let response = app.get("/sales?party=Ravi%20Traders").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["kind"], "sale");
    let dates: Vec<&str> = response.body["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-05-07", "2024-05-01"]);
}

#[tokio::test]
async fn list_pages_results() {
    let app = TestApp::spawn();
    for day in 1..=3 {
        app.create_document(
            "purchases",
            simple_document(&format!("2024-05-0{}", day), "Kaveri Tiles", "1", "10"),
        )
        .await;
    }

    let response = app.get("/purchases?page=2&page_size=2").await;

    assert_eq!(response.body["page"], 2);
    assert_eq!(response.body["page_size"], 2);
    let documents = response.body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["date"], "2024-05-01");
}

#[tokio::test]
async fn list_filters_by_fiscal_year() {
    let app = TestApp::spawn();
    app.create_document("sales", simple_document("2024-03-31", "A", "1", "10"))
        .await;
    app.create_document("sales", simple_document("2024-04-01", "A", "1", "10"))
        .await;

    let response = app.get("/sales?year=2024-25").await;

    let documents = response.body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["date"], "2024-04-01");
}

#[tokio::test]
async fn preview_applies_pending_edits() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/totals/preview",
            json!({
                "lines": [{ "descriptor": "Black Galaxy", "quantity_area": "10", "rate": "40" }],
                "charges": { "tax": "10" },
                "advance": "200",
                "operations": [
                    { "op": "edit_line", "index": 0, "field": "rate", "value": "50" },
                    { "op": "add_line", "descriptor": "Tan Brown", "quantity_area": "5", "rate": "20" },
                    { "op": "set_charge", "kind": "tempo", "value": "5" }
                ]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["lines"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["lines"][0]["amount"], "500.00");
    assert_eq!(response.body["gross_total"], "615.00");
    assert_eq!(response.body["balance"], "415.00");
}

#[tokio::test]
async fn preview_refuses_to_drop_the_only_line() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/totals/preview",
            json!({
                "lines": [{ "descriptor": "Tiles", "quantity": "1", "rate": "10" }],
                "operations": [{ "op": "remove_line", "index": 0 }]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preview_rejects_out_of_range_edit() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/totals/preview",
            json!({
                "lines": [{ "descriptor": "Tiles", "quantity": "1", "rate": "10" }],
                "operations": [{ "op": "edit_line", "index": 3, "field": "rate", "value": "5" }]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_figures_do_not_break_the_request() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/totals/preview",
            json!({
                "lines": [
                    { "descriptor": "Granite", "quantity": "99999999999999999999", "rate": "99999999999999999999" },
                    { "descriptor": "Granite", "quantity": "999999999999", "rate": "999999999999" }
                ],
                "charges": { "tax": "79228162514264337593543950335" }
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["lines"][0]["amount"], "0.00");
    assert_eq!(
        response.body["lines"][1]["amount"],
        "999999999998000000000001.00"
    );
    assert_eq!(response.body["charges_total"], "0.00");

    let sale = app
        .create_document(
            "sales",
            simple_document("2024-05-05", "Ravi Traders", "99999999999999999999", "2"),
        )
        .await;
    assert_eq!(sale["gross_total"], "0.00");
}

#[tokio::test]
async fn array_body_is_rejected() {
    let app = TestApp::spawn();

    let response = app
        .post("/totals/preview", json!([{ "descriptor": "Tiles" }]))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().is_some());
}
