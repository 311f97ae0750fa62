//! Order total arithmetic.
//!
//! Pure functions over anything [`Priced`]. Values are raw decimals; turning
//! them into `"182.00 kr"` is left to [`crate::format`].
//!
//! Arithmetic saturates at [`Decimal::MAX`] / [`Decimal::MIN`] instead of
//! overflowing, so absurd prices stored in a cart can never abort a session.

use rust_decimal::Decimal;
use sukkergris_core::{Price, Quantity, ShippingOption};

/// A line that can be totalled.
pub trait Priced {
    /// Unit price, already coerced (unusable prices are zero).
    fn unit_price(&self) -> Price;

    /// Units on the line.
    fn quantity(&self) -> Quantity;
}

/// `price x quantity` for one line.
#[must_use]
pub fn line_total(line: &impl Priced) -> Decimal {
    line.unit_price().times(line.quantity())
}

/// Sum of all line totals. An empty slice is zero.
#[must_use]
pub fn subtotal<L: Priced>(lines: &[L]) -> Decimal {
    lines
        .iter()
        .map(line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Subtotal plus the shipping price. No shipping selection counts as free.
///
/// Checkout must still refuse to place an order without a shipping option;
/// that check lives in [`crate::checkout`].
#[must_use]
pub fn grand_total(subtotal: Decimal, shipping: Option<&ShippingOption>) -> Decimal {
    subtotal.saturating_add(shipping.map_or(Decimal::ZERO, |option| option.price.amount()))
}

/// Subtotal and grand total computed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Compute fresh totals for `lines` and an optional shipping option.
    #[must_use]
    pub fn compute<L: Priced>(lines: &[L], shipping: Option<&ShippingOption>) -> Self {
        let subtotal = subtotal(lines);
        let total = grand_total(subtotal, shipping);
        Self {
            subtotal,
            shipping: total.saturating_sub(subtotal),
            total,
        }
    }
}
