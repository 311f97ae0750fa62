//! Product identity resolution.
//!
//! Product payloads from the catalogue API, the search results and older
//! stored carts name their identifier differently. This adapter turns any of
//! them into a [`ProductKey`] so the cart only ever sees one identity type.

use serde_json::{Map, Number, Value};
use sukkergris_core::ProductKey;

/// Identifier fields, in the order they are consulted.
pub const IDENTITY_FIELDS: [&str; 4] = ["id", "productNumber", "product_id", "productId"];

/// Resolve the identity of a product object.
///
/// The first field from [`IDENTITY_FIELDS`] that is present and not `null`
/// decides. If that value is empty (`""`, `0`, `false`) or not a scalar, the
/// product has no usable identity and `None` is returned; later fields are
/// not consulted.
#[must_use]
pub fn resolve_product_key(product: &Map<String, Value>) -> Option<ProductKey> {
    let value = IDENTITY_FIELDS
        .iter()
        .find_map(|field| product.get(*field).filter(|v| !v.is_null()))?;
    key_from_value(value)
}

/// Turn a raw identifier value into a key.
///
/// Strings are used as-is, numbers by their decimal text (`7.0` becomes
/// `"7"`), and `true` becomes `"true"`.
#[must_use]
pub fn key_from_value(value: &Value) -> Option<ProductKey> {
    match value {
        Value::String(s) if !s.is_empty() => Some(ProductKey::new(s.as_str())),
        Value::Number(n) => number_key(n),
        Value::Bool(true) => Some(ProductKey::new("true")),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_key(n: &Number) -> Option<ProductKey> {
    if let Some(i) = n.as_i64() {
        return (i != 0).then(|| ProductKey::new(i.to_string()));
    }
    if let Some(u) = n.as_u64() {
        return Some(ProductKey::new(u.to_string()));
    }
    let f = n.as_f64()?;
    if f == 0.0 || !f.is_finite() {
        return None;
    }
    // Integral floats print like integers, matching how the catalogue renders ids
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Some(ProductKey::new((f as i64).to_string()));
    }
    let text = n.to_string();
    if f.fract() == 0.0 && f.abs() < 1.0e21 {
        if let Some(digits) = expand_integral(&text) {
            return Some(ProductKey::new(digits));
        }
    }
    Some(ProductKey::new(text))
}

/// Spell out the shortest float text of an integral value (`1e16`,
/// `1.152921504606847e18`) as plain digits padded with zeros.
fn expand_integral(text: &str) -> Option<String> {
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return text.strip_suffix(".0").map(str::to_owned);
    };
    let exponent: usize = exponent.trim_start_matches('+').parse().ok()?;
    let (sign, mantissa) = mantissa
        .strip_prefix('-')
        .map_or(("", mantissa), |rest| ("-", rest));
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    let width = whole.len() + exponent;
    if digits.len() > width {
        return None;
    }
    Some(format!("{sign}{digits:0<width$}"))
}
