//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                      - Liveness check
//! GET    /health/ready                                - Readiness check (database)
//!
//! # Users
//! GET    /users                                       - List users
//! POST   /users                                       - Create user
//! GET    /users/{user_id}                             - Get user
//! PUT    /users/{user_id}                             - Replace user
//! DELETE /users/{user_id}                             - Delete user (409 if it owns orders)
//!
//! # Products
//! GET    /products                                    - List products
//! POST   /products                                    - Create product
//! GET    /products/{product_id}                       - Get product
//! PUT    /products/{product_id}                       - Replace product
//! DELETE /products/{product_id}                       - Delete product
//!
//! # Orders
//! POST   /orders                                      - Create order
//! GET    /orders/{order_id}                           - Get order
//! DELETE /orders/{order_id}                           - Delete order
//! GET    /orders/{order_id}/add_product/{product_id}  - Add product to order (PUT also accepted)
//! DELETE /orders/{order_id}/remove_product            - Remove product named in body
//! GET    /orders/{order_id}/products                  - Products of an order
//! GET    /orders/user/{user_id}                       - Orders of a user
//! ```

pub mod extract;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    routing::{delete, get, post},
};
use serde::Serialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Body of a successful delete: `{"message": "User deleted"}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route(
            "/{user_id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{product_id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/user/{user_id}", get(orders::for_user))
        .route("/{order_id}", get(orders::show).delete(orders::destroy))
        .route(
            "/{order_id}/add_product/{product_id}",
            get(orders::add_product).put(orders::add_product),
        )
        .route("/{order_id}/remove_product", delete(orders::remove_product))
        .route("/{order_id}/products", get(orders::products))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
}

/// Build the application with request tracing and state attached.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::StatusCode,
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;

    /// Router over a pool that never connects. Only requests rejected before
    /// touching the database can be exercised here.
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://localhost:1/unused")
            .unwrap();
        app(AppState::new(pool))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, body) = send(json_request("POST", "/users", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_create_user_missing_fields() {
        let (status, body) = send(json_request("POST", "/users", r#"{"name": "A"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert!(body["errors"]["address"].is_array());
        assert!(body["errors"]["email"].is_array());
        assert!(body["errors"].get("name").is_none());
    }

    #[tokio::test]
    async fn test_create_user_invalid_email() {
        let (status, body) = send(json_request(
            "POST",
            "/users",
            r#"{"name": "A", "address": "X", "email": "not-an-email"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let request = Request::builder()
            .uri("/users/abc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_create_product_negative_price() {
        let (status, body) = send(json_request(
            "POST",
            "/products",
            r#"{"product_name": "Widget", "price": -5}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["price"].is_array());
    }

    #[tokio::test]
    async fn test_create_order_requires_user_id() {
        let (status, body) = send(json_request("POST", "/orders", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["user_id"].is_array());
    }

    #[tokio::test]
    async fn test_create_order_bad_date() {
        let (status, body) = send(json_request(
            "POST",
            "/orders",
            r#"{"user_id": 1, "order_date": "yesterday"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["order_date"].is_array());
    }

    #[tokio::test]
    async fn test_out_of_range_ids_are_not_found() {
        let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

        let (status, body) = send(get("/users/99999999999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");

        let (status, body) = send(get("/products/-99999999999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");

        let (status, body) = send(get("/orders/1/add_product/99999999999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");

        let (status, body) = send(get("/orders/user/99999999999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_unknown_order_wins_over_bad_remove_body() {
        // Out-of-range order IDs are resolved from the path alone.
        let (status, body) = send(json_request(
            "DELETE",
            "/orders/99999999999/remove_product",
            "{}",
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Order not found");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
