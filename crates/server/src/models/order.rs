//! Order domain types.

use chrono::{DateTime, NaiveDateTime, Utc};
use orderdesk_core::{FieldErrors, OrderId, UserId};

use super::Product;

/// An order together with the products it contains.
///
/// `products` is a snapshot read with the order; membership only changes
/// through `OrderRepository::add_product` and `OrderRepository::remove_product`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub user_id: UserId,
    /// Distinct products, ordered by product ID.
    pub products: Vec<Product>,
}

/// Input for creating an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    /// When `None`, the database stamps the current time.
    pub order_date: Option<DateTime<Utc>>,
}

impl NewOrder {
    /// Validate raw input.
    ///
    /// `order_date` may be RFC 3339 (`2026-01-02T10:00:00Z`) or a timestamp
    /// without offset (`2026-01-02T10:00:00`), which is taken as UTC.
    ///
    /// # Errors
    ///
    /// Returns [`FieldErrors`] if `user_id` is missing or `order_date` does
    /// not parse.
    pub fn validate(
        user_id: Option<UserId>,
        order_date: Option<&str>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        if user_id.is_none() {
            errors.missing("user_id");
        }
        let order_date = order_date.and_then(|raw| {
            let parsed = parse_order_date(raw);
            if parsed.is_none() {
                errors.add("order_date", "Not a valid datetime.");
            }
            parsed
        });

        errors.finish(|| {
            Some(Self {
                user_id: user_id?,
                order_date,
            })
        })
    }
}

fn parse_order_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults_date_to_none() {
        let order = NewOrder::validate(Some(UserId::new(1)), None).unwrap();
        assert_eq!(order.user_id, UserId::new(1));
        assert!(order.order_date.is_none());
    }

    #[test]
    fn test_validate_requires_user() {
        let errors = NewOrder::validate(None, Some("2026-01-02T10:00:00Z")).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["user_id"]);
    }

    #[test]
    fn test_validate_order_date_formats() {
        let expected = DateTime::parse_from_rfc3339("2026-01-02T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        for raw in [
            "2026-01-02T10:00:00Z",
            "2026-01-02T12:00:00+02:00",
            "2026-01-02T10:00:00",
            "2026-01-02T10:00:00.000",
        ] {
            let order = NewOrder::validate(Some(UserId::new(1)), Some(raw)).unwrap();
            assert_eq!(order.order_date, Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let errors = NewOrder::validate(Some(UserId::new(1)), Some("yesterday")).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["order_date"]);
    }
}
