//! Seed the database with a small demo dataset.
//!
//! Creates two users, three products and one order for the first user
//! containing two of the products. Seeding twice is a no-op: the first
//! user's email is unique, so a second run stops at the first insert.

use orderdesk_server::db::{OrderRepository, ProductRepository, RepositoryError, UserRepository};
use orderdesk_server::models::{NewOrder, NewProduct, NewUser};
use rust_decimal::Decimal;

use super::{CommandError, connect};

const USERS: [(&str, &str, &str); 2] = [
    ("Ada Lovelace", "12 St James's Square, London", "ada@example.com"),
    ("Alan Turing", "78 High Street, Hampton", "alan@example.com"),
];

/// Name and price in cents.
const PRODUCTS: [(&str, i64); 3] = [
    ("Mechanical Keyboard", 8_999),
    ("USB-C Cable", 1_250),
    ("Desk Lamp", 3_400),
];

/// Insert the demo dataset.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let orders = OrderRepository::new(&pool);

    let mut user_ids = Vec::with_capacity(USERS.len());
    for (name, address, email) in USERS {
        let new_user = NewUser::validate(
            Some(name.to_string()),
            Some(address.to_string()),
            Some(email.to_string()),
        )?;
        match users.create(&new_user).await {
            Ok(user) => user_ids.push(user.id),
            Err(RepositoryError::DuplicateEmail) => {
                tracing::info!(%email, "Demo data already present, nothing to do");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, cents) in PRODUCTS {
        let new_product =
            NewProduct::validate(Some(name.to_string()), Some(Decimal::new(cents, 2)))?;
        product_ids.push(products.create(&new_product).await?.id);
    }

    if let Some(&owner) = user_ids.first() {
        let order = orders
            .create(NewOrder {
                user_id: owner,
                order_date: None,
            })
            .await?;
        for &product_id in product_ids.iter().take(2) {
            orders.add_product(order.id, product_id).await?;
        }
        tracing::info!(order_id = %order.id, "Seeded demo order");
    }

    tracing::info!(
        users = user_ids.len(),
        products = product_ids.len(),
        "Seed complete!"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_data_is_valid() {
        for (name, address, email) in USERS {
            NewUser::validate(
                Some(name.to_string()),
                Some(address.to_string()),
                Some(email.to_string()),
            )
            .unwrap();
        }
        for (name, cents) in PRODUCTS {
            NewProduct::validate(Some(name.to_string()), Some(Decimal::new(cents, 2))).unwrap();
        }
    }
}
