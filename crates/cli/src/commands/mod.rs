//! Command implementations.
//!
//! Every command opens the file-backed store from the configured data
//! directory, so state carries over between invocations the way a browser's
//! local storage carries over between page loads.

pub mod cart;
pub mod checkout;
pub mod orders;

use rust_decimal::Decimal;
use sukkergris_storefront::StorefrontError;
use sukkergris_storefront::config::StorefrontConfig;
use sukkergris_storefront::storage::FileStore;

/// Loaded configuration plus the opened store.
pub struct Context {
    pub config: StorefrontConfig,
    pub store: FileStore,
}

impl Context {
    /// Open the data directory named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open(config: StorefrontConfig) -> Result<Self, StorefrontError> {
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self { config, store })
    }

    /// Format an amount with the configured currency suffix.
    #[must_use]
    pub fn money(&self, amount: Decimal) -> String {
        sukkergris_storefront::format::money(amount, &self.config.currency_suffix)
    }
}

/// Show a failure to the user without leaking internals.
#[allow(clippy::print_stderr)]
pub fn print_error(error: &StorefrontError) {
    eprintln!("error: {}", error.user_message());
}
