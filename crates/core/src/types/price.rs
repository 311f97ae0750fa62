//! Price representation using decimal arithmetic.
//!
//! Product data arrives as loosely typed JSON, so prices and stock counts are
//! coerced: a JSON number, a numeric string or a boolean is accepted, anything
//! else (missing, `null`, text, values out of range) becomes zero.

use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::Quantity;

/// Coerce a loosely typed JSON value into a decimal, defaulting to zero.
///
/// Strings are trimmed before parsing and an empty string is zero. Both plain
/// (`"32.50"`) and scientific (`"1e2"`) notations are accepted. `true` counts
/// as one and `false` as zero, the way the catalogue scripts read flags.
#[must_use]
pub fn coerce_decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        Some(Value::Bool(true)) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

fn parse_decimal(text: &str) -> Decimal {
    if text.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

/// A unit price in the store currency.
///
/// Serialized as a plain JSON number so stored orders stay readable by the
/// admin views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Resolve a display price from a raw product field.
    #[must_use]
    pub fn coerce(value: Option<&Value>) -> Self {
        Self(coerce_decimal(value))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units, saturating at the bounds of [`Decimal`].
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity.get()))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
