//! Product repository.

use orderdesk_core::{Price, ProductId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Internal row type for `products` queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub(super) id: ProductId,
    pub(super) product_name: String,
    pub(super) price: Decimal,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            product_name: row.product_name,
            price,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, product_name, price
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, product_name, price
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::product_not_found(id))?.try_into()
    }

    /// Create a product. Names are not unique.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (product_name, price)
            VALUES ($1, $2)
            RETURNING id, product_name, price
            ",
        )
        .bind(&product.product_name)
        .bind(product.price.amount())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(product_id = %row.id, "product created");
        row.try_into()
    }

    /// Replace the name and price of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET product_name = $2, price = $3
            WHERE id = $1
            RETURNING id, product_name, price
            ",
        )
        .bind(id)
        .bind(&product.product_name)
        .bind(product.price.amount())
        .fetch_optional(self.pool)
        .await?;

        let row = row.ok_or(RepositoryError::product_not_found(id))?;
        tracing::info!(product_id = %id, "product updated");
        row.try_into()
    }

    /// Delete a product.
    ///
    /// Order memberships of the product are removed with it
    /// (`ON DELETE CASCADE` on `order_product.product_id`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::product_not_found(id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
