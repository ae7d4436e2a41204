//! Order repository and order membership management.
//!
//! Membership is never edited through an in-memory collection: adding or
//! removing a product is a single repository call that issues the
//! `order_product` mutation inside its own transaction and then re-reads the
//! order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use orderdesk_core::{OrderId, ProductId, UserId};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use super::products::ProductRow;
use super::{RepositoryError, is_foreign_key_violation, is_unique_violation};
use crate::models::{NewOrder, Order, Product};

/// Internal row type for `orders` queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_date: DateTime<Utc>,
    user_id: UserId,
}

impl OrderRow {
    fn with_products(self, products: Vec<Product>) -> Order {
        Order {
            id: self.id,
            order_date: self.order_date,
            user_id: self.user_id,
            products,
        }
    }
}

/// A product joined through `order_product`, tagged with its order.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    product: ProductRow,
}

/// Load the products of one order, ordered by product ID.
async fn products_of<'e>(
    executor: impl PgExecutor<'e>,
    order_id: OrderId,
) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        r"
        SELECT p.id, p.product_name, p.price
        FROM products p
        JOIN order_product op ON op.product_id = p.id
        WHERE op.order_id = $1
        ORDER BY p.id
        ",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Lock an order row for the rest of the transaction.
async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
) -> Result<OrderRow, RepositoryError> {
    sqlx::query_as::<_, OrderRow>(
        r"
        SELECT id, order_date, user_id
        FROM orders
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(RepositoryError::order_not_found(order_id))
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order for an existing user, with no products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user does not exist.
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let invalid_user = || RepositoryError::InvalidReference {
            entity: "User",
            id: order.user_id.as_i32(),
        };

        let user_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(order.user_id)
                .fetch_one(self.pool)
                .await?;
        if !user_exists {
            return Err(invalid_user());
        }

        // The foreign key still decides if the user is deleted in between.
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, order_date)
            VALUES ($1, COALESCE($2, now()))
            RETURNING id, order_date, user_id
            ",
        )
        .bind(order.user_id)
        .bind(order.order_date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                return invalid_user();
            }
            RepositoryError::Database(e)
        })?;

        tracing::info!(order_id = %row.id, user_id = %row.user_id, "order created");
        Ok(row.with_products(Vec::new()))
    }

    /// Get an order with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_date, user_id
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::order_not_found(id))?;

        let products = products_of(self.pool, id).await?;
        Ok(row.with_products(products))
    }

    /// Whether an order with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Delete an order. Its memberships are removed with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::order_not_found(id));
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Add a product to an order.
    ///
    /// The order row is locked while membership is checked, so two
    /// concurrent adds of the same product serialize and the second one
    /// sees the first. The composite primary key on `order_product` backs
    /// this up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or product does not exist.
    /// Returns `RepositoryError::DuplicateAssociation` if the product is already in the order.
    pub async fn add_product(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Order, RepositoryError> {
        let duplicate = || RepositoryError::DuplicateAssociation {
            order_id,
            product_id,
        };

        let mut tx = self.pool.begin().await?;
        let order = lock_order(&mut tx, order_id).await?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;
        if !product_exists {
            return Err(RepositoryError::product_not_found(product_id));
        }

        let already_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM order_product WHERE order_id = $1 AND product_id = $2)",
        )
        .bind(order_id)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_member {
            return Err(duplicate());
        }

        sqlx::query("INSERT INTO order_product (order_id, product_id) VALUES ($1, $2)")
            .bind(order_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return duplicate();
                }
                if is_foreign_key_violation(&e) {
                    return RepositoryError::product_not_found(product_id);
                }
                RepositoryError::Database(e)
            })?;

        let products = products_of(&mut *tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(%order_id, %product_id, "product added to order");
        Ok(order.with_products(products))
    }

    /// Remove a product from an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::AssociationNotFound` if the product is not in the order.
    pub async fn remove_product(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = lock_order(&mut tx, order_id).await?;

        let result = sqlx::query("DELETE FROM order_product WHERE order_id = $1 AND product_id = $2")
            .bind(order_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::AssociationNotFound {
                order_id,
                product_id,
            });
        }

        let products = products_of(&mut *tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(%order_id, %product_id, "product removed from order");
        Ok(order.with_products(products))
    }

    /// List every order owned by a user, with products.
    ///
    /// An empty result is reported as `NoOrders` rather than an empty list;
    /// a user that does not exist is indistinguishable from one without
    /// orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NoOrders` if the user has no orders.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_date, user_id
            FROM orders
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Err(RepositoryError::NoOrders { user_id });
        }

        let order_ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let members = sqlx::query_as::<_, MemberRow>(
            r"
            SELECT op.order_id, p.id, p.product_name, p.price
            FROM order_product op
            JOIN products p ON p.id = op.product_id
            WHERE op.order_id = ANY($1)
            ORDER BY op.order_id, p.id
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<Product>> = HashMap::new();
        for member in members {
            by_order
                .entry(member.order_id)
                .or_default()
                .push(member.product.try_into()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let products = by_order.remove(&row.id).unwrap_or_default();
                row.with_products(products)
            })
            .collect())
    }

    /// List the products of an order. An order without products yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn products_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Product>, RepositoryError> {
        if !self.exists(order_id).await? {
            return Err(RepositoryError::order_not_found(order_id));
        }

        products_of(self.pool, order_id).await
    }
}
