//! Display projection of cart lines.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use sukkergris_core::{Price, ProductKey, Quantity};

use super::ProductSnapshot;
use crate::totals::Priced;

/// One cart line, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Product identity.
    pub product_id: ProductKey,
    /// Display name.
    pub name: String,
    /// Units in the cart.
    pub quantity: Quantity,
    /// Unit price, zero when the snapshot price is unusable.
    pub price: Price,
    /// Units in stock, zero when unknown.
    pub stock: Decimal,
    /// Expected shipping date text, when the product is on backorder.
    pub expected_shipping: Option<String>,
}

/// Stock note shown under a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// At least one unit in stock.
    InStock,
    /// Out of stock, restock expected on this date.
    ExpectedShipping(NaiveDate),
    /// Out of stock with no known restock date.
    NotInStock,
}

impl CartLineView {
    pub(crate) fn project(product_id: &ProductKey, product: &ProductSnapshot, quantity: Quantity) -> Self {
        Self {
            product_id: product_id.clone(),
            name: product.name().to_owned(),
            quantity,
            price: product.price(),
            stock: product.stock(),
            expected_shipping: product.expected_shipping().map(str::to_owned),
        }
    }

    /// Stock note for this line.
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.stock > Decimal::ZERO {
            return Availability::InStock;
        }
        self.expected_shipping
            .as_deref()
            .and_then(parse_shipping_date)
            .map_or(Availability::NotInStock, Availability::ExpectedShipping)
    }
}

impl Priced for CartLineView {
    fn unit_price(&self) -> Price {
        self.price
    }

    fn quantity(&self) -> Quantity {
        self.quantity
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
#[must_use]
pub fn parse_shipping_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}
