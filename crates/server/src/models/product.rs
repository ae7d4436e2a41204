//! Product domain types.

use orderdesk_core::{FieldErrors, Price, ProductId};
use rust_decimal::Decimal;

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    pub price: Price,
}

/// Validated product fields for creation and full-replace updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub product_name: String,
    pub price: Price,
}

impl NewProduct {
    /// Width of the `products.product_name` column.
    pub const NAME_MAX: usize = 200;

    /// Validate raw input, reporting every bad field at once.
    ///
    /// # Errors
    ///
    /// Returns [`FieldErrors`] if the name is missing or blank, or the price
    /// is missing, negative, or has more than two decimal places.
    pub fn validate(
        product_name: Option<String>,
        price: Option<Decimal>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let product_name = errors.require_text("product_name", product_name, Self::NAME_MAX);
        let price = match price {
            None => {
                errors.missing("price");
                None
            }
            Some(amount) => Price::new(amount)
                .map_err(|e| errors.add("price", format!("Invalid price: {e}.")))
                .ok(),
        };

        errors.finish(|| {
            Some(Self {
                product_name: product_name?,
                price: price?,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_validate_ok() {
        let product =
            NewProduct::validate(Some("Widget".into()), Some(Decimal::from_str("9.99").unwrap()))
                .unwrap();
        assert_eq!(product.product_name, "Widget");
        assert_eq!(product.price.to_string(), "9.99");
    }

    #[test]
    fn test_validate_negative_price() {
        let errors =
            NewProduct::validate(Some("Widget".into()), Some(Decimal::from(-1))).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["price"]);
    }

    #[test]
    fn test_validate_missing_everything() {
        let errors = NewProduct::validate(None, None).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["price", "product_name"]
        );
    }
}
