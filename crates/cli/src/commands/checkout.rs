//! Checkout commands.

use sukkergris_core::ShippingId;
use sukkergris_storefront::StorefrontError;
use sukkergris_storefront::cart::CartStore;
use sukkergris_storefront::checkout::{Checkout, CheckoutEvent, CheckoutForm};
use tracing::info;

use super::Context;

/// Checkout flags.
#[derive(Debug, Default)]
pub struct CheckoutInput {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub zip: String,
    pub shipping: Option<String>,
}

/// List the configured shipping options.
#[allow(clippy::print_stdout)]
pub fn shipping(ctx: &Context) {
    for option in &ctx.config.shipping_options {
        println!(
            "{:<10} {:<30} {:>12}",
            option.id,
            option.name,
            ctx.money(option.price.amount())
        );
    }
}

/// Validate and place an order from the current cart.
///
/// # Errors
///
/// Returns the checkout error if validation fails or the shipping id is
/// unknown. Nothing is written in that case.
#[allow(clippy::print_stdout)]
pub fn place(ctx: &Context, input: CheckoutInput) -> Result<(), StorefrontError> {
    let mut cart = CartStore::open(ctx.store.clone());
    let mut checkout = Checkout::new(ctx.config.shipping_options.clone(), ctx.config.checkout);
    checkout.subscribe(|event| match event {
        CheckoutEvent::OrderPlaced { order } => {
            info!(order_number = %order.order_number, items = order.item_count(), "Order placed");
        }
    });

    checkout.update_form(CheckoutForm {
        name: input.name,
        email: input.email,
        address: input.address,
        phone: input.phone,
        city: input.city,
        zip: input.zip,
    })?;
    if let Some(id) = input.shipping {
        checkout.select_shipping(&ShippingId::new(id))?;
    }

    let order = checkout.submit(&mut cart)?;
    println!("Order #{} placed", order.order_number);
    println!("Total: {}", ctx.money(order.total.amount()));
    Ok(())
}
