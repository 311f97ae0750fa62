//! Unified error handling.
//!
//! Each concern has its own error type; [`StorefrontError`] gathers them for
//! callers such as the CLI. Internal failures are reported to the user with a
//! generic message, validation failures verbatim.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::orders::OrderLogError;
use crate::storage::StorageError;

/// Crate-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Checkout was refused.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Orders log operation failed.
    #[error("Orders error: {0}")]
    Orders(#[from] OrderLogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl StorefrontError {
    /// Message suitable for showing to a shopper or admin.
    ///
    /// Storage and configuration details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Orders(OrderLogError::Storage(_)) => {
                "Something went wrong, please try again".to_string()
            }
            Self::Config(_) => "The storefront is misconfigured".to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::Orders(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
