//! Database operations for the orderdesk `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - customers, `email` unique
//! - `products` - catalogue, `price` non-negative
//! - `orders` - one row per order, `user_id` references `users`
//! - `order_product` - order membership, primary key `(order_id, product_id)`
//!
//! The storage constraints are authoritative for every invariant. The
//! repositories check the common failure cases first so they can report a
//! precise error, and map constraint violations that still slip through
//! (concurrent requests) onto the same errors.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded in
//! [`MIGRATOR`]. They are not run on server startup:
//! ```bash
//! cargo run -p orderdesk-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use orderdesk_core::{OrderId, ProductId, UserId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The requested entity does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Another user already has this email address.
    #[error("Email already exists")]
    DuplicateEmail,

    /// A foreign key on the input points at a missing row.
    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: i32 },

    /// The product is already part of the order.
    #[error("Product already in order")]
    DuplicateAssociation {
        order_id: OrderId,
        product_id: ProductId,
    },

    /// The product is not part of the order.
    #[error("Product not found in order")]
    AssociationNotFound {
        order_id: OrderId,
        product_id: ProductId,
    },

    /// The user has no orders at all.
    #[error("No orders found for this user")]
    NoOrders { user_id: UserId },

    /// The user still owns orders and cannot be deleted.
    #[error("User has existing orders")]
    HasOrders { user_id: UserId },
}

impl RepositoryError {
    pub(crate) const fn user_not_found(id: UserId) -> Self {
        Self::NotFound {
            entity: "User",
            id: id.as_i32(),
        }
    }

    pub(crate) const fn product_not_found(id: ProductId) -> Self {
        Self::NotFound {
            entity: "Product",
            id: id.as_i32(),
        }
    }

    pub(crate) const fn order_not_found(id: OrderId) -> Self {
        Self::NotFound {
            entity: "Order",
            id: id.as_i32(),
        }
    }
}

/// Whether `err` is a `UNIQUE` or primary key violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Whether `err` is a `FOREIGN KEY` violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the recorded history
/// does not match the embedded files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
