//! User repository.

use orderdesk_core::{Email, UserId};
use sqlx::PgPool;

use super::{RepositoryError, is_foreign_key_violation, is_unique_violation};
use crate::models::{NewUser, User};

/// Internal row type for `users` queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    address: String,
    email: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email for user {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            email,
        })
    }
}

/// Map a write error, turning an email uniqueness violation into
/// [`RepositoryError::DuplicateEmail`].
fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        return RepositoryError::DuplicateEmail;
    }
    RepositoryError::Database(err)
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, address, email
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    pub async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, address, email
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::user_not_found(id))?.try_into()
    }

    /// Whether a user with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateEmail` if the email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, address, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, email
            ",
        )
        .bind(&user.name)
        .bind(&user.address)
        .bind(user.email.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        tracing::info!(user_id = %row.id, "user created");
        row.try_into()
    }

    /// Replace all mutable fields of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::DuplicateEmail` if another user has the email.
    pub async fn update(&self, id: UserId, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET name = $2, address = $3, email = $4
            WHERE id = $1
            RETURNING id, name, address, email
            ",
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.address)
        .bind(user.email.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let row = row.ok_or(RepositoryError::user_not_found(id))?;
        tracing::info!(user_id = %id, "user updated");
        row.try_into()
    }

    /// Delete a user who owns no orders.
    ///
    /// The user row is locked while its orders are counted, so an order
    /// created concurrently either lands first (and blocks the delete) or
    /// waits until the user is gone (and fails its foreign key check).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::HasOrders` if the user still owns orders.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepositoryError::user_not_found(id));
        }

        let has_orders =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM orders WHERE user_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if has_orders {
            return Err(RepositoryError::HasOrders { user_id: id });
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return RepositoryError::HasOrders { user_id: id };
                }
                RepositoryError::Database(e)
            })?;

        tx.commit().await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
