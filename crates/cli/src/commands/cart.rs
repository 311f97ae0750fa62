//! Cart commands.

use serde_json::{Map, Value, json};
use sukkergris_core::{ProductKey, ShippingId};
use sukkergris_storefront::StorefrontError;
use sukkergris_storefront::cart::{Availability, CartLineView, CartStore};
use sukkergris_storefront::checkout::{Checkout, CheckoutPolicy};
use sukkergris_storefront::storage::FileStore;
use sukkergris_storefront::totals;
use tracing::info;

use super::Context;

/// Product fields given as individual flags.
#[derive(Debug, Default)]
pub struct ProductFields {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub expected_shipped: Option<String>,
}

/// Build the product payload from `--json` or the individual flags.
///
/// # Errors
///
/// Returns [`StorefrontError::BadRequest`] if `--json` is not a JSON object.
pub fn product_json(raw: Option<&str>, fields: ProductFields) -> Result<Value, StorefrontError> {
    if let Some(raw) = raw {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| StorefrontError::BadRequest(format!("invalid product JSON: {e}")))?;
        if !value.is_object() {
            return Err(StorefrontError::BadRequest(
                "product JSON must be an object".to_string(),
            ));
        }
        return Ok(value);
    }

    let mut product = Map::new();
    if let Some(id) = fields.id {
        product.insert("id".into(), json!(id));
    }
    if let Some(name) = fields.name {
        product.insert("name".into(), json!(name));
    }
    if let Some(price) = fields.price {
        product.insert("price".into(), json!(price));
    }
    if let Some(stock) = fields.stock {
        product.insert("stock".into(), json!(stock));
    }
    if let Some(date) = fields.expected_shipped {
        product.insert("expectedShipped".into(), json!(date));
    }
    Ok(Value::Object(product))
}

fn open_cart(ctx: &Context) -> CartStore<FileStore> {
    CartStore::open(ctx.store.clone())
}

/// Add one unit of `product`.
///
/// # Errors
///
/// Returns [`StorefrontError::BadRequest`] if the product has no usable id.
pub fn add(ctx: &Context, product: &Value) -> Result<(), StorefrontError> {
    let mut cart = open_cart(ctx);
    let quantity = cart.add(product).ok_or_else(|| {
        StorefrontError::BadRequest(
            "product needs one of id, productNumber, product_id or productId".to_string(),
        )
    })?;
    info!(quantity = quantity.get(), "Added to cart");
    print_cart(ctx, &cart, None);
    Ok(())
}

fn missing(product_id: &str) -> StorefrontError {
    StorefrontError::NotFound(format!("product {product_id} is not in the cart"))
}

/// Set a line quantity.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the product is not in the cart.
pub fn set(ctx: &Context, product_id: &str, quantity: f64) -> Result<(), StorefrontError> {
    let mut cart = open_cart(ctx);
    if !cart.set_quantity(&ProductKey::new(product_id), quantity) {
        return Err(missing(product_id));
    }
    print_cart(ctx, &cart, None);
    Ok(())
}

/// Step a line up or down by one unit.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the product is not in the cart.
pub fn step(ctx: &Context, product_id: &str, up: bool) -> Result<(), StorefrontError> {
    let mut cart = open_cart(ctx);
    let key = ProductKey::new(product_id);
    let changed = if up {
        cart.increment(&key)
    } else {
        cart.decrement(&key)
    };
    if !changed {
        return Err(missing(product_id));
    }
    print_cart(ctx, &cart, None);
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the product is not in the cart.
pub fn remove(ctx: &Context, product_id: &str) -> Result<(), StorefrontError> {
    let mut cart = open_cart(ctx);
    if !cart.remove(&ProductKey::new(product_id)) {
        return Err(missing(product_id));
    }
    print_cart(ctx, &cart, None);
    Ok(())
}

/// Empty the cart.
pub fn clear(ctx: &Context) {
    let mut cart = open_cart(ctx);
    if cart.clear() {
        info!("Cart cleared");
    }
    print_cart(ctx, &cart, None);
}

/// Show the cart, optionally totalled with a shipping option.
///
/// # Errors
///
/// Returns an error if the shipping id is unknown.
pub fn list(ctx: &Context, shipping: Option<&str>) -> Result<(), StorefrontError> {
    let cart = open_cart(ctx);
    let mut checkout = Checkout::new(ctx.config.shipping_options.clone(), CheckoutPolicy::default());
    if let Some(id) = shipping {
        checkout.select_shipping(&ShippingId::new(id))?;
    }
    print_cart(ctx, &cart, Some(&checkout));
    Ok(())
}

fn availability_note(line: &CartLineView) -> String {
    match line.availability() {
        Availability::InStock => String::new(),
        Availability::ExpectedShipping(date) => {
            format!("  (expected shipping: {})", date.format("%d %b %Y"))
        }
        Availability::NotInStock => "  (not in stock)".to_string(),
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(ctx: &Context, cart: &CartStore<FileStore>, checkout: Option<&Checkout>) {
    let lines = cart.list();
    if lines.is_empty() {
        println!("Your shopping cart is empty.");
        return;
    }

    for line in &lines {
        println!(
            "{:<10} {:<30} x{:<4} {:>12} {:>12}{}",
            line.product_id,
            line.name,
            line.quantity,
            ctx.money(line.price.amount()),
            ctx.money(totals::line_total(line)),
            availability_note(line),
        );
    }

    let subtotal = totals::subtotal(&lines);
    println!("{:<47} {:>25}", "Subtotal", ctx.money(subtotal));
    if let Some(option) = checkout.and_then(Checkout::shipping) {
        println!("{:<47} {:>25}", option.name, ctx.money(option.price.amount()));
        println!(
            "{:<47} {:>25}",
            "Total",
            ctx.money(totals::grand_total(subtotal, Some(option)))
        );
    }
    println!("{} item(s)", cart.item_count());
}
