//! Domain models.
//!
//! These are validated domain objects, separate from both the database row
//! types in [`crate::db`] and the wire types in [`crate::routes`].

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrder, Order};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
