//! Shipping options offered at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Price, ShippingId};

/// Errors that can occur when building a [`ShippingOption`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShippingError {
    /// The option has no id.
    #[error("shipping option id cannot be empty")]
    EmptyId,
    /// Flat shipping prices cannot be negative.
    #[error("shipping option {id} has a negative price")]
    NegativePrice {
        /// Offending option id.
        id: String,
    },
}

/// A named delivery method with a flat price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Stable identifier (e.g. `mail`).
    pub id: ShippingId,
    /// Display name.
    pub name: String,
    /// Flat price, always `>= 0`.
    pub price: Price,
}

impl ShippingOption {
    /// Create a validated shipping option.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank or the price is negative.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, ShippingError> {
        let option = Self {
            id: ShippingId::new(id),
            name: name.into(),
            price: Price::new(price),
        };
        option.validate()?;
        Ok(option)
    }

    /// Check the invariants of an option that came from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank or the price is negative.
    pub fn validate(&self) -> Result<(), ShippingError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ShippingError::EmptyId);
        }
        if self.price.amount().is_sign_negative() && !self.price.amount().is_zero() {
            return Err(ShippingError::NegativePrice {
                id: self.id.to_string(),
            });
        }
        Ok(())
    }
}
