//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SUKKERGRIS_DATA_DIR` - Directory for the file-backed store (default: .sukkergris)
//! - `SUKKERGRIS_CURRENCY_SUFFIX` - Currency suffix for display (default: kr)
//! - `SUKKERGRIS_SHIPPING_OPTIONS` - JSON array of `{"id", "name", "price"}` objects
//! - `SUKKERGRIS_REQUIRE_ADDRESS` - Require a street address at checkout (default: false)

use std::path::PathBuf;

use rust_decimal::Decimal;
use sukkergris_core::ShippingOption;
use thiserror::Error;

use crate::checkout::CheckoutPolicy;
use crate::format::DEFAULT_CURRENCY_SUFFIX;

const DEFAULT_DATA_DIR: &str = ".sukkergris";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where the durable store keeps its files
    pub data_dir: PathBuf,
    /// Suffix appended to formatted amounts
    pub currency_suffix: String,
    /// Shipping options offered at checkout
    pub shipping_options: Vec<ShippingOption>,
    /// Checkout rules
    pub checkout: CheckoutPolicy,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            currency_suffix: DEFAULT_CURRENCY_SUFFIX.to_string(),
            shipping_options: default_shipping_options(),
            checkout: CheckoutPolicy::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("SUKKERGRIS_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let currency_suffix = lookup("SUKKERGRIS_CURRENCY_SUFFIX")
            .unwrap_or_else(|| DEFAULT_CURRENCY_SUFFIX.to_string());

        let shipping_options = match lookup("SUKKERGRIS_SHIPPING_OPTIONS") {
            Some(raw) => parse_shipping_options(&raw)?,
            None => default_shipping_options(),
        };

        let require_address = match lookup("SUKKERGRIS_REQUIRE_ADDRESS") {
            Some(raw) => parse_bool("SUKKERGRIS_REQUIRE_ADDRESS", &raw)?,
            None => false,
        };

        Ok(Self {
            data_dir,
            currency_suffix,
            shipping_options,
            checkout: CheckoutPolicy { require_address },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Built-in shipping options.
#[must_use]
pub fn default_shipping_options() -> Vec<ShippingOption> {
    [
        ("pickup", "Pick up in store", Decimal::ZERO),
        ("mail", "Standard mail", Decimal::from(39)),
        ("express", "Express delivery", Decimal::from(99)),
    ]
    .into_iter()
    .filter_map(|(id, name, price)| ShippingOption::new(id, name, price).ok())
    .collect()
}

/// Parse and validate a JSON list of shipping options.
fn parse_shipping_options(raw: &str) -> Result<Vec<ShippingOption>, ConfigError> {
    const KEY: &str = "SUKKERGRIS_SHIPPING_OPTIONS";

    let options: Vec<ShippingOption> = serde_json::from_str(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(KEY.to_string(), e.to_string()))?;
    if options.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            KEY.to_string(),
            "at least one shipping option is required".to_string(),
        ));
    }
    for option in &options {
        option
            .validate()
            .map_err(|e| ConfigError::InvalidEnvVar(KEY.to_string(), e.to_string()))?;
    }
    Ok(options)
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`, case-insensitive).
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".sukkergris"));
        assert_eq!(config.currency_suffix, "kr");
        assert_eq!(config.shipping_options.len(), 3);
        assert!(!config.checkout.require_address);
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("SUKKERGRIS_DATA_DIR", "/tmp/sg"),
            ("SUKKERGRIS_CURRENCY_SUFFIX", "NOK"),
            (
                "SUKKERGRIS_SHIPPING_OPTIONS",
                r#"[{"id": "mail", "name": "Mail", "price": 49.5}]"#,
            ),
            ("SUKKERGRIS_REQUIRE_ADDRESS", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/sg"));
        assert_eq!(config.currency_suffix, "NOK");
        assert_eq!(config.shipping_options[0].price.amount(), Decimal::new(495, 1));
        assert!(config.checkout.require_address);
    }

    #[test]
    fn test_negative_shipping_price_rejected() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[(
            "SUKKERGRIS_SHIPPING_OPTIONS",
            r#"[{"id": "mail", "name": "Mail", "price": -1}]"#,
        )]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_malformed_shipping_json_rejected() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[(
            "SUKKERGRIS_SHIPPING_OPTIONS",
            "not json",
        )]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("SUKKERGRIS_SHIPPING_OPTIONS", "[]")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("SUKKERGRIS_REQUIRE_ADDRESS", "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
