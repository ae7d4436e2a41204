//! Order endpoints, including order membership.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use orderdesk_core::{FieldErrors, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use super::extract::{JsonBody, PathParams};
use super::products::{ProductResponse, to_responses};
use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{NewOrder, Order};
use crate::state::AppState;

/// Body of `POST /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<UserId>,
    pub order_date: Option<String>,
}

impl CreateOrderRequest {
    fn validate(&self) -> std::result::Result<NewOrder, FieldErrors> {
        NewOrder::validate(self.user_id, self.order_date.as_deref())
    }
}

/// Body of `DELETE /orders/{order_id}/remove_product`.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveProductRequest {
    pub product_id: Option<ProductId>,
}

impl RemoveProductRequest {
    fn validate(&self) -> std::result::Result<ProductId, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.product_id.is_none() {
            errors.missing("product_id");
        }
        errors.finish(|| self.product_id)
    }
}

/// Path of `/orders/{order_id}/add_product/{product_id}`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MembershipPath {
    pub order_id: OrderId,
    pub product_id: ProductId,
}

/// Wire representation of an order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub user_id: UserId,
    pub products: Vec<ProductResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_date: order.order_date,
            user_id: order.user_id,
            products: to_responses(order.products),
        }
    }
}

/// `POST /orders`
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let new_order = body.validate()?;
    let order = OrderRepository::new(state.pool()).create(new_order).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// `GET /orders/{order_id}`
pub async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.pool()).get(id).await?;
    Ok(Json(order.into()))
}

/// `DELETE /orders/{order_id}`
pub async fn destroy(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<MessageResponse>> {
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(Json(MessageResponse::new("Order deleted")))
}

/// `GET /orders/{order_id}/add_product/{product_id}`, also routed for `PUT`.
pub async fn add_product(
    State(state): State<AppState>,
    PathParams(MembershipPath {
        order_id,
        product_id,
    }): PathParams<MembershipPath>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.pool())
        .add_product(order_id, product_id)
        .await?;
    Ok(Json(order.into()))
}

/// `DELETE /orders/{order_id}/remove_product`
///
/// The product to remove is named in the body: `{"product_id": 7}`. An
/// unknown order is reported before any problem with the body.
pub async fn remove_product(
    State(state): State<AppState>,
    PathParams(order_id): PathParams<OrderId>,
    body: std::result::Result<JsonBody<RemoveProductRequest>, AppError>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());
    if !repo.exists(order_id).await? {
        return Err(RepositoryError::order_not_found(order_id).into());
    }
    let JsonBody(body) = body?;
    let product_id = body.validate()?;
    let order = repo.remove_product(order_id, product_id).await?;
    Ok(Json(order.into()))
}

/// `GET /orders/user/{user_id}`
pub async fn for_user(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// `GET /orders/{order_id}/products`
pub async fn products(
    State(state): State<AppState>,
    PathParams(order_id): PathParams<OrderId>,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = OrderRepository::new(state.pool())
        .products_for_order(order_id)
        .await?;
    Ok(Json(to_responses(products)))
}
