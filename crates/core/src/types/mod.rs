//! Core types for Sukkergris.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod shipping;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, coerce_decimal};
pub use quantity::{Quantity, QuantityError};
pub use shipping::{ShippingError, ShippingOption};
pub use status::*;
