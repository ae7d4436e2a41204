//! Product prices.
//!
//! Prices are exact decimals (`rust_decimal`) stored in a `NUMERIC(12,2)`
//! column. Floats only appear at the JSON boundary.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reasons a price is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be negative")]
    Negative,
    #[error("price can have at most {max} decimal places")]
    TooPrecise { max: u32 },
    #[error("price must be less than {max}")]
    TooLarge { max: Decimal },
}

/// A non-negative monetary amount with at most two decimal places.
///
/// No currency is tracked; every price in the catalogue shares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of fractional digits the column keeps.
    pub const SCALE: u32 = 2;

    /// Exclusive upper bound imposed by `NUMERIC(12,2)`.
    pub const LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Zero, the cheapest valid price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the amount is negative, has more than two
    /// decimal places, or does not fit the storage column.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }
        if normalized >= Self::LIMIT {
            return Err(PriceError::TooLarge { max: Self::LIMIT });
        }
        Ok(Self(normalized.abs()))
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
