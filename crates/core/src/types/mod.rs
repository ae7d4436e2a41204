//! Domain value types for orderdesk.

pub mod email;
pub mod id;
pub mod price;
pub mod validation;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use validation::FieldErrors;
