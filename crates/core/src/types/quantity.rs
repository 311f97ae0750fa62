//! Cart line quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Quantity`] from raw input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A positive whole number of units.
///
/// A cart line can never hold zero or a negative number of items, so the
/// invariant lives in the type. Raw user input goes through
/// [`Quantity::normalize`], which floors and clamps instead of failing.
///
/// ```
/// use sukkergris_core::Quantity;
///
/// assert_eq!(Quantity::normalize(2.7).get(), 2);
/// assert_eq!(Quantity::normalize(0.0).get(), 1);
/// assert_eq!(Quantity::normalize(-5.0).get(), 1);
/// assert_eq!(Quantity::normalize(f64::NAN).get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Normalize arbitrary numeric input to `max(1, floor(value))`.
    ///
    /// Non-finite input is treated as 1; values above `u32::MAX` saturate.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn normalize(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ONE;
        }
        let floored = value.floor().max(1.0).min(f64::from(u32::MAX));
        // floored is within 1..=u32::MAX here
        Self::new(floored as u32).unwrap_or(Self::ONE)
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more unit, saturating at `u32::MAX`.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less unit, never dropping below one.
    #[must_use]
    pub fn decrement(self) -> Self {
        Self::new(self.get() - 1).unwrap_or(Self::ONE)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(QuantityError::Zero)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
