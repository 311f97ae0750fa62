//! Display formatting for money values.

use rust_decimal::{Decimal, RoundingStrategy};

/// Default currency suffix.
pub const DEFAULT_CURRENCY_SUFFIX: &str = "kr";

/// Format an amount with exactly two decimals and a currency suffix.
///
/// ```
/// use rust_decimal::Decimal;
/// use sukkergris_storefront::format::money;
///
/// assert_eq!(money(Decimal::from(182), "kr"), "182.00 kr");
/// ```
#[must_use]
pub fn money(amount: Decimal, suffix: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2} {suffix}")
}
