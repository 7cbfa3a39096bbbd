#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use erp_service::config::ErpConfig;
use erp_service::services::{init_metrics, Database, MemoryStore, Store};
use erp_service::startup::{build_router, AppState};
use serde_json::Value;
use std::sync::{Arc, Once, OnceLock};
use tower::ServiceExt;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        init_metrics();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "erp_service=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Serializes tests that share the PostgreSQL database.
pub fn database_lock() -> &'static tokio::sync::Mutex<()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(()))
}

/// Name that will not collide with earlier runs against the same database.
pub fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Router over a fresh in-memory store.
    pub fn spawn() -> Self {
        init_tracing();

        let state = AppState {
            config: ErpConfig::for_tests(),
            store: Arc::new(MemoryStore::new()),
        };

        Self {
            router: build_router(state),
        }
    }

    /// Router over the PostgreSQL store at `TEST_DATABASE_URL`.
    ///
    /// The database is shared by every test in the run, so callers should
    /// hold [`database_lock`] and use unique names and dates.
    pub async fn spawn_postgres() -> Self {
        init_tracing();

        let database_url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set to run the PostgreSQL tests");

        let database = Database::new(&database_url, 2, 1)
            .await
            .expect("Failed to connect to test database");
        database
            .run_migrations()
            .await
            .expect("Failed to run migrations");

        let store: Arc<dyn Store> = Arc::new(database);
        let state = AppState {
            config: ErpConfig::for_tests(),
            store,
        };

        Self {
            router: build_router(state),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    /// Create an account and return its id.
    pub async fn create_account(&self, name: &str, opening_balance: &str) -> String {
        let response = self
            .post(
                "/accounts",
                serde_json::json!({ "name": name, "opening_balance": opening_balance }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["account_id"]
            .as_str()
            .expect("Missing account_id")
            .to_string()
    }

    /// Create a document of the given kind (`estimates`, `sales`, `purchases`).
    pub async fn create_document(&self, collection: &str, body: Value) -> Value {
        let response = self.post(&format!("/{}", collection), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

/// The worked example: two area-priced lines, tax and tempo, and an advance.
pub fn reference_document(date: &str, party: &str) -> Value {
    serde_json::json!({
        "date": date,
        "party_name": party,
        "vehicle_number": "KA-01-1234",
        "lines": [
            { "descriptor": "Black Galaxy", "quantity": "2", "quantity_area": "10", "rate": "50" },
            { "descriptor": "Tan Brown", "quantity": "1", "quantity_area": "5", "rate": "20" }
        ],
        "charges": { "tax": "10", "tempo": "5" },
        "advance": "200"
    })
}

/// One plain line, no charges.
pub fn simple_document(date: &str, party: &str, quantity: &str, rate: &str) -> Value {
    serde_json::json!({
        "date": date,
        "party_name": party,
        "lines": [{ "descriptor": "Tiles 2x2", "quantity": quantity, "rate": rate }]
    })
}
