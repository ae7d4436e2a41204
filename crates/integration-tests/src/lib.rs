//! Integration tests for Orderdesk.
//!
//! # Running Tests
//!
//! ```bash
//! export ORDERDESK_TEST_DATABASE_URL=postgres://localhost/orderdesk_test
//! cargo test -p orderdesk-integration-tests -- --ignored
//! ```
//!
//! Each test starts the API in-process on an ephemeral port against the
//! test database, after applying migrations. Tests share the database, so
//! every helper creates rows with unique values and assertions only look
//! at rows the test created itself.

use std::net::SocketAddr;

use orderdesk_server::{db, routes, state::AppState};
use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use sqlx::PgPool;
use serde_json::{Value, json};
use uuid::Uuid;

/// Environment variable naming the test database.
pub const DATABASE_URL_VAR: &str = "ORDERDESK_TEST_DATABASE_URL";

/// A running server, an HTTP client pointed at it, and a pool on the same
/// database for checking stored rows directly.
pub struct TestContext {
    pub client: Client,
    pub addr: SocketAddr,
    pub pool: PgPool,
}

impl TestContext {
    /// Migrate the test database and serve the API on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the test database is not configured or unreachable.
    pub async fn new() -> Self {
        let database_url = std::env::var(DATABASE_URL_VAR)
            .unwrap_or_else(|_| panic!("{DATABASE_URL_VAR} must be set"));

        let pool = db::create_pool(&SecretString::from(database_url))
            .await
            .expect("Failed to connect to test database");
        db::migrate(&pool).await.expect("Failed to run migrations");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(AppState::new(pool.clone()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            client: Client::new(),
            addr,
            pool,
        }
    }

    /// Number of stored orders owned by `user_id`.
    pub async fn order_count(&self, user_id: i64) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(i32::try_from(user_id).expect("user id out of range"))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count orders")
    }

    /// Number of stored users with `email`.
    pub async fn user_count(&self, email: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count users")
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Response {
        let request = self.client.put(self.url(path));
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        request.send().await.expect("PUT failed")
    }

    pub async fn delete(&self, path: &str, body: Option<&Value>) -> Response {
        let request = self.client.delete(self.url(path));
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        request.send().await.expect("DELETE failed")
    }

    /// Create a user with a unique email and return its JSON.
    pub async fn create_user(&self) -> Value {
        let resp = self
            .post(
                "/users",
                &json!({
                    "name": "Test User",
                    "address": "1 Test Street",
                    "email": unique_email(),
                }),
            )
            .await;
        expect_json(resp, StatusCode::CREATED).await
    }

    /// Create a product and return its JSON.
    pub async fn create_product(&self, name: &str, price: f64) -> Value {
        let resp = self
            .post("/products", &json!({ "product_name": name, "price": price }))
            .await;
        expect_json(resp, StatusCode::CREATED).await
    }

    /// Create an order for `user_id` and return its JSON.
    pub async fn create_order(&self, user_id: i64) -> Value {
        let resp = self.post("/orders", &json!({ "user_id": user_id })).await;
        expect_json(resp, StatusCode::CREATED).await
    }
}

/// An email no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// Assert the response status and decode its JSON body.
///
/// # Panics
///
/// Panics if the status differs or the body is not JSON.
pub async fn expect_json(resp: Response, status: StatusCode) -> Value {
    let actual = resp.status();
    let body: Value = resp.json().await.expect("Response body is not JSON");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

/// The `id` field of a JSON object.
///
/// # Panics
///
/// Panics if `id` is missing or not an integer.
#[must_use]
pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("object has no integer id")
}

/// Product IDs of an order JSON, in response order.
#[must_use]
pub fn product_ids(order: &Value) -> Vec<i64> {
    order["products"]
        .as_array()
        .map(|products| products.iter().map(id_of).collect())
        .unwrap_or_default()
}
