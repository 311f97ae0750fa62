//! Sukkergris CLI - drive the cart, checkout and orders log from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add a product (twice) and show the cart
//! sg-cli cart add --id 7 --name "Banana Bug Bonanza" --price 32
//! sg-cli cart add --json '{"id": "7", "price": 32}'
//! sg-cli cart list
//!
//! # Place the order
//! sg-cli checkout --name "Kari Nordmann" --email kari@example.no --shipping mail
//!
//! # Show the confirmation and the admin orders log
//! sg-cli confirmation
//! sg-cli orders list
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, update, remove and list cart lines
//! - `shipping` - List shipping options
//! - `checkout` - Validate and place an order
//! - `confirmation` - Show the last placed order
//! - `orders` - List or delete orders in the admin log

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use sukkergris_storefront::StorefrontError;
use sukkergris_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(author, version, about = "Sukkergris storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List shipping options
    Shipping,
    /// Validate and place an order from the current cart
    Checkout(CheckoutArgs),
    /// Show the last placed order
    Confirmation,
    /// Manage the admin orders log
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add(ProductArgs),
    /// Set the quantity of a line
    Set {
        /// Product id
        product_id: String,
        /// New quantity (floored, minimum 1)
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
    },
    /// Add one unit to a line
    Inc {
        /// Product id
        product_id: String,
    },
    /// Remove one unit from a line (never below 1)
    Dec {
        /// Product id
        product_id: String,
    },
    /// Remove a line
    Remove {
        /// Product id
        product_id: String,
    },
    /// Empty the cart
    Clear,
    /// Show the cart with totals
    List {
        /// Shipping option to include in the total
        #[arg(short, long)]
        shipping: Option<String>,
    },
}

#[derive(Args)]
struct ProductArgs {
    /// Raw product JSON object (overrides the other flags)
    #[arg(long)]
    json: Option<String>,
    /// Product id
    #[arg(long)]
    id: Option<String>,
    /// Product name
    #[arg(long)]
    name: Option<String>,
    /// Unit price
    #[arg(long)]
    price: Option<f64>,
    /// Units in stock
    #[arg(long)]
    stock: Option<i64>,
    /// Expected shipping date (YYYY-MM-DD) when out of stock
    #[arg(long)]
    expected_shipped: Option<String>,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Customer name
    #[arg(short, long, default_value = "")]
    name: String,
    /// Customer email
    #[arg(short, long, default_value = "")]
    email: String,
    /// Street address
    #[arg(short, long, default_value = "")]
    address: String,
    /// Phone number
    #[arg(long, default_value = "")]
    phone: String,
    /// City
    #[arg(long, default_value = "")]
    city: String,
    /// Postal code
    #[arg(long, default_value = "")]
    zip: String,
    /// Shipping option id
    #[arg(short, long)]
    shipping: Option<String>,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List,
    /// Delete an order by number
    Delete {
        /// Order number (e.g. SG-3F09A1C2)
        order_number: String,
    },
}

fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sukkergris_storefront=info,sg_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        commands::print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), StorefrontError> {
    let config = StorefrontConfig::from_env()?;
    let ctx = commands::Context::open(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add(product) => {
                let product = commands::cart::product_json(
                    product.json.as_deref(),
                    commands::cart::ProductFields {
                        id: product.id,
                        name: product.name,
                        price: product.price,
                        stock: product.stock,
                        expected_shipped: product.expected_shipped,
                    },
                )?;
                commands::cart::add(&ctx, &product)?;
            }
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&ctx, &product_id, quantity)?,
            CartAction::Inc { product_id } => commands::cart::step(&ctx, &product_id, true)?,
            CartAction::Dec { product_id } => commands::cart::step(&ctx, &product_id, false)?,
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, &product_id)?,
            CartAction::Clear => commands::cart::clear(&ctx),
            CartAction::List { shipping } => commands::cart::list(&ctx, shipping.as_deref())?,
        },
        Commands::Shipping => commands::checkout::shipping(&ctx),
        Commands::Checkout(args) => commands::checkout::place(
            &ctx,
            commands::checkout::CheckoutInput {
                name: args.name,
                email: args.email,
                address: args.address,
                phone: args.phone,
                city: args.city,
                zip: args.zip,
                shipping: args.shipping,
            },
        )?,
        Commands::Confirmation => commands::orders::confirmation(&ctx)?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&ctx)?,
            OrdersAction::Delete { order_number } => {
                commands::orders::delete(&ctx, &order_number)?;
            }
        },
    }
    Ok(())
}
