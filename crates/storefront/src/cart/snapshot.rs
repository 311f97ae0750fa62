//! Product snapshots held by cart lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sukkergris_core::{Price, ProductKey, coerce_decimal};

use super::identity::resolve_product_key;

/// Fields consulted for the expected shipping date, in order.
const EXPECTED_SHIPPING_FIELDS: [&str; 3] =
    ["expected_shipped", "expectedShipped", "expected_shipping"];

/// Fallback display name.
pub const DEFAULT_PRODUCT_NAME: &str = "Product";

/// A copy of the product data captured when it was added to the cart.
///
/// Kept as the raw JSON object so fields the cart does not know about survive
/// a round trip through storage. Typed accessors coerce on read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductSnapshot(Map<String, Value>);

impl ProductSnapshot {
    /// Wrap a product object. Returns `None` for anything but a JSON object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The identity of this product, if it has one.
    #[must_use]
    pub fn key(&self) -> Option<ProductKey> {
        resolve_product_key(&self.0)
    }

    /// Shallow merge: every field of `newer` overwrites the same field here.
    pub fn merge(&mut self, newer: Self) {
        self.0.extend(newer.0);
    }

    /// Raw field access.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Display name, falling back to [`DEFAULT_PRODUCT_NAME`].
    #[must_use]
    pub fn name(&self) -> &str {
        self.0
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PRODUCT_NAME)
    }

    /// Unit price; anything that is not a finite number is zero.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::coerce(self.0.get("price"))
    }

    /// Units in stock; anything that is not a finite number is zero.
    #[must_use]
    pub fn stock(&self) -> Decimal {
        coerce_decimal(self.0.get("stock"))
    }

    /// Raw expected shipping date text, if any variant of the field is set.
    #[must_use]
    pub fn expected_shipping(&self) -> Option<&str> {
        EXPECTED_SHIPPING_FIELDS
            .iter()
            .find_map(|field| self.0.get(*field).filter(|v| !v.is_null()))
            .and_then(Value::as_str)
    }

    /// The underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ProductSnapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
