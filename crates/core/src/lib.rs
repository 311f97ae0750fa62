//! Sukkergris Core - Shared types library.
//!
//! This crate provides common types used across all Sukkergris components:
//! - `storefront` - Cart store, order totals and checkout
//! - `cli` - Command-line driver for the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! clocks. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product keys, quantities, prices, emails,
//!   shipping options and checkout phases

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
