//! Product endpoints.

use axum::{Json, extract::State, http::StatusCode};
use orderdesk_core::{FieldErrors, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use super::extract::{JsonBody, PathParams};
use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::{NewProduct, Product};
use crate::state::AppState;

/// Body of `POST /products` and `PUT /products/{product_id}`.
///
/// `name` is accepted as an alias of `product_name`. `price` may be a JSON
/// number or a decimal string.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    #[serde(alias = "name")]
    pub product_name: Option<String>,
    pub price: Option<Decimal>,
}

impl ProductRequest {
    fn validate(self) -> std::result::Result<NewProduct, FieldErrors> {
        NewProduct::validate(self.product_name, self.price)
    }
}

/// Wire representation of a product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            product_name: product.product_name,
            price: product.price.amount(),
        }
    }
}

/// Map a list of products to their wire form.
pub(super) fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(Into::into).collect()
}

/// `GET /products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(to_responses(products)))
}

/// `GET /products/{product_id}`
pub async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
) -> Result<Json<ProductResponse>> {
    let product = ProductRepository::new(state.pool()).get(id).await?;
    Ok(Json(product.into()))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let new_product = body.validate()?;
    let product = ProductRepository::new(state.pool())
        .create(&new_product)
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /products/{product_id}`
pub async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
    JsonBody(body): JsonBody<ProductRequest>,
) -> Result<Json<ProductResponse>> {
    let repo = ProductRepository::new(state.pool());
    // An unknown product is reported before any problem with the body.
    repo.get(id).await?;
    let new_product = body.validate()?;
    let product = repo.update(id, &new_product).await?;
    Ok(Json(product.into()))
}

/// `DELETE /products/{product_id}`
pub async fn destroy(
    State(state): State<AppState>,
    PathParams(id): PathParams<ProductId>,
) -> Result<Json<MessageResponse>> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use orderdesk_core::Price;

    use super::*;

    #[test]
    fn test_price_is_a_json_number() {
        let product = Product {
            id: ProductId::new(1),
            product_name: "Widget".into(),
            price: Price::new(Decimal::from_str("9.99").unwrap()).unwrap(),
        };
        let json = serde_json::to_value(ProductResponse::from(product)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 1, "product_name": "Widget", "price": 9.99 })
        );
    }

    #[test]
    fn test_request_accepts_name_alias_and_number() {
        let body: ProductRequest =
            serde_json::from_str(r#"{"name": "Widget", "price": 9.99}"#).unwrap();
        let product = body.validate().unwrap();
        assert_eq!(product.product_name, "Widget");
        assert_eq!(product.price.to_string(), "9.99");
    }

    #[test]
    fn test_request_accepts_price_string() {
        let body: ProductRequest =
            serde_json::from_str(r#"{"product_name": "Widget", "price": "12.50"}"#).unwrap();
        assert_eq!(body.validate().unwrap().price.to_string(), "12.50");
    }

    #[test]
    fn test_request_rejects_negative_price() {
        let body: ProductRequest =
            serde_json::from_str(r#"{"product_name": "Widget", "price": -1}"#).unwrap();
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["price"]);
    }
}
