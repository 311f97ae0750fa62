//! Sukkergris Storefront library.
//!
//! Cart state, order totals and checkout for the Sukkergris candy shop,
//! independent of any UI. The shell (browser views, CLI) calls into
//! [`cart::CartStore`] and [`checkout::Checkout`] directly and subscribes to
//! their events to know when to re-render.
//!
//! # Modules
//!
//! - [`cart`] - Cart store, product identity adapter, display projection
//! - [`totals`] - Subtotal and grand total arithmetic
//! - [`checkout`] - `Draft -> Validated -> Placed` checkout flow
//! - [`orders`] - Placed orders, confirmation projection, admin orders log
//! - [`storage`] - Durable key-value storage adapters
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod format;
mod observer;
pub mod orders;
pub mod storage;
pub mod totals;

pub use error::{Result, StorefrontError};
pub use observer::SubscriptionId;
