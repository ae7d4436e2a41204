//! Integration tests for orders and order membership.
//!
//! These tests require a running `PostgreSQL` database named by
//! `ORDERDESK_TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p orderdesk-integration-tests -- --ignored

use orderdesk_integration_tests::{TestContext, expect_json, id_of, product_ids};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_order_lifecycle() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let p1 = id_of(&ctx.create_product("Widget", 9.99).await);
    let p2 = id_of(&ctx.create_product("Gadget", 5.0).await);

    let order = ctx.create_order(user_id).await;
    let order_id = id_of(&order);
    assert_eq!(order["user_id"], user_id);
    assert_eq!(order["products"], json!([]));
    assert!(order["order_date"].is_string());

    let order = expect_json(
        ctx.get(&format!("/orders/{order_id}/add_product/{p1}"))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(product_ids(&order), vec![p1]);

    let order = expect_json(
        ctx.get(&format!("/orders/{order_id}/add_product/{p2}"))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(product_ids(&order), vec![p1, p2]);

    let products = expect_json(
        ctx.get(&format!("/orders/{order_id}/products")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(products.as_array().expect("array body").len(), 2);

    let order = expect_json(
        ctx.delete(
            &format!("/orders/{order_id}/remove_product"),
            Some(&json!({ "product_id": p1 })),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(product_ids(&order), vec![p2]);

    let orders = expect_json(
        ctx.get(&format!("/orders/user/{user_id}")).await,
        StatusCode::OK,
    )
    .await;
    let orders = orders.as_array().expect("array body");
    assert_eq!(orders.len(), 1);
    assert_eq!(product_ids(orders.first().expect("one order")), vec![p2]);

    let deleted = expect_json(
        ctx.delete(&format!("/orders/{order_id}"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(deleted, json!({ "message": "Order deleted" }));
    expect_json(
        ctx.get(&format!("/orders/{order_id}")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_order_with_explicit_date() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);

    let order = expect_json(
        ctx.post(
            "/orders",
            &json!({ "user_id": user_id, "order_date": "2026-01-02T10:00:00" }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(order["order_date"], "2026-01-02T10:00:00Z");
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_order_for_unknown_user_rejected() {
    let ctx = TestContext::new().await;

    // A user that existed once, so its ID is known not to be reused.
    let user_id = id_of(&ctx.create_user().await);
    expect_json(
        ctx.delete(&format!("/users/{user_id}"), None).await,
        StatusCode::OK,
    )
    .await;

    let resp = ctx.post("/orders", &json!({ "user_id": user_id })).await;
    expect_json(resp, StatusCode::BAD_REQUEST).await;
    assert_eq!(ctx.order_count(user_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_duplicate_add_rejected() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let order_id = id_of(&ctx.create_order(user_id).await);
    let product_id = id_of(&ctx.create_product("Widget", 1.0).await);
    let path = format!("/orders/{order_id}/add_product/{product_id}");

    expect_json(ctx.get(&path).await, StatusCode::OK).await;
    let dup = expect_json(ctx.get(&path).await, StatusCode::BAD_REQUEST).await;
    assert_eq!(dup, json!({ "message": "Product already in order" }));

    let order = expect_json(ctx.get(&format!("/orders/{order_id}")).await, StatusCode::OK).await;
    assert_eq!(product_ids(&order), vec![product_id]);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_concurrent_adds_keep_one_membership() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let order_id = id_of(&ctx.create_order(user_id).await);
    let product_id = id_of(&ctx.create_product("Widget", 1.0).await);
    let path = format!("/orders/{order_id}/add_product/{product_id}");

    let (a, b) = tokio::join!(ctx.get(&path), ctx.get(&path));
    let mut statuses = [a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let order = expect_json(ctx.get(&format!("/orders/{order_id}")).await, StatusCode::OK).await;
    assert_eq!(product_ids(&order), vec![product_id]);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_add_unknown_product_or_order() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let order_id = id_of(&ctx.create_order(user_id).await);
    let product_id = id_of(&ctx.create_product("Widget", 1.0).await);

    let body = expect_json(
        ctx.get(&format!("/orders/{order_id}/add_product/2147483647"))
            .await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["message"], "Product not found");

    let body = expect_json(
        ctx.get(&format!("/orders/2147483647/add_product/{product_id}"))
            .await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["message"], "Order not found");
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_remove_non_member_is_not_found() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let order_id = id_of(&ctx.create_order(user_id).await);
    let member = id_of(&ctx.create_product("Member", 1.0).await);
    let outsider = id_of(&ctx.create_product("Outsider", 2.0).await);

    expect_json(
        ctx.get(&format!("/orders/{order_id}/add_product/{member}"))
            .await,
        StatusCode::OK,
    )
    .await;

    let body = expect_json(
        ctx.delete(
            &format!("/orders/{order_id}/remove_product"),
            Some(&json!({ "product_id": outsider })),
        )
        .await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body, json!({ "message": "Product not found in order" }));

    let order = expect_json(ctx.get(&format!("/orders/{order_id}")).await, StatusCode::OK).await;
    assert_eq!(product_ids(&order), vec![member]);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_remove_checks_order_before_body() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let order_id = id_of(&ctx.create_order(user_id).await);
    expect_json(
        ctx.delete(&format!("/orders/{order_id}"), None).await,
        StatusCode::OK,
    )
    .await;

    let body = expect_json(
        ctx.delete(&format!("/orders/{order_id}/remove_product"), Some(&json!({})))
            .await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["message"], "Order not found");

    let live_order = id_of(&ctx.create_order(user_id).await);
    let body = expect_json(
        ctx.delete(&format!("/orders/{live_order}/remove_product"), Some(&json!({})))
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(body["errors"]["product_id"].is_array());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_user_without_orders_is_not_found() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);

    let body = expect_json(
        ctx.get(&format!("/orders/user/{user_id}")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body, json!({ "message": "No orders found for this user" }));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_empty_order_products_is_empty_list() {
    let ctx = TestContext::new().await;
    let user_id = id_of(&ctx.create_user().await);
    let order_id = id_of(&ctx.create_order(user_id).await);

    let products = expect_json(
        ctx.get(&format!("/orders/{order_id}/products")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(products, json!([]));

    expect_json(
        ctx.get("/orders/2147483647/products").await,
        StatusCode::NOT_FOUND,
    )
    .await;
}
