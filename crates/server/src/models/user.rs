//! User domain types.

use orderdesk_core::{Email, FieldErrors, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub address: String,
    pub email: Email,
}

/// The three mutable user fields, validated.
///
/// Used for both creation and full-replace updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub address: String,
    pub email: Email,
}

impl NewUser {
    /// Width of the `users.name` column.
    pub const NAME_MAX: usize = 50;
    /// Width of the `users.address` column.
    pub const ADDRESS_MAX: usize = 150;

    /// Validate raw input, reporting every bad field at once.
    ///
    /// # Errors
    ///
    /// Returns [`FieldErrors`] if any field is missing, blank, too long, or
    /// (for `email`) malformed.
    pub fn validate(
        name: Option<String>,
        address: Option<String>,
        email: Option<String>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.require_text("name", name, Self::NAME_MAX);
        let address = errors.require_text("address", address, Self::ADDRESS_MAX);
        let email = match email {
            None => {
                errors.missing("email");
                None
            }
            Some(raw) => Email::parse(&raw)
                .map_err(|e| errors.add("email", format!("Not a valid email address: {e}.")))
                .ok(),
        };

        errors.finish(|| {
            Some(Self {
                name: name?,
                address: address?,
                email: email?,
            })
        })
    }
}
