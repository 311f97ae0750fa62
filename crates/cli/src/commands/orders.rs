//! Confirmation and admin orders log commands.

use sukkergris_core::OrderNumber;
use sukkergris_storefront::StorefrontError;
use sukkergris_storefront::orders::{self, Confirmation, OrderLog};

use super::Context;

/// Show the last placed order.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if no order has been placed.
#[allow(clippy::print_stdout)]
pub fn confirmation(ctx: &Context) -> Result<(), StorefrontError> {
    let order = orders::last_order(&ctx.store)
        .ok_or_else(|| StorefrontError::NotFound("no order has been placed yet".to_string()))?;
    let view = Confirmation::from_order(&order, &ctx.config.currency_suffix);

    println!("Order {}", view.order_number);
    println!("Name: {}", view.customer_name);
    println!("Email: {}", view.customer_email);
    println!("Address: {}", view.customer_address);
    println!("Phone: {}", view.customer_phone);
    println!("Shipping: {}", view.shipping_method);
    for item in &view.items {
        println!(
            "{:<10} {:<30} x{:<4} {:>12} {:>12}",
            item.product_id, item.name, item.quantity, item.unit_price, item.line_total
        );
    }
    println!("Total: {}", view.total);
    Ok(())
}

/// List orders, newest first.
///
/// # Errors
///
/// Returns an error if the log cannot be read.
#[allow(clippy::print_stdout)]
pub fn list(ctx: &Context) -> Result<(), StorefrontError> {
    let orders = OrderLog::new(&ctx.store).list()?;
    println!("{} order(s)", orders.len());
    for order in &orders {
        println!(
            "#{:<12} {}  {:<25} {:>4} item(s)  {:>12}",
            order.order_number,
            order.order_date.format("%Y-%m-%d %H:%M"),
            order.customer.name,
            order.item_count(),
            ctx.money(order.total.amount()),
        );
    }
    Ok(())
}

/// Delete an order from the log.
///
/// # Errors
///
/// Returns an error if the order does not exist or the log cannot be written.
#[allow(clippy::print_stdout)]
pub fn delete(ctx: &Context, order_number: &str) -> Result<(), StorefrontError> {
    let number = OrderNumber::new(order_number.trim_start_matches('#'));
    OrderLog::new(&ctx.store).delete(&number)?;
    println!("Deleted order #{number}");
    Ok(())
}
