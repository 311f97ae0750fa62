//! Integration tests for the Sukkergris storefront.
//!
//! The tests drive the cart, checkout and orders log through the file-backed
//! store, so every scenario also exercises persistence across reloads.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sukkergris-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart operations and reload from disk
//! - `checkout_flow` - Checkout, confirmation and the orders log

use serde_json::{Value, json};
use sukkergris_storefront::cart::CartStore;
use sukkergris_storefront::storage::FileStore;
use tempfile::TempDir;

/// A file store in a fresh temporary directory.
///
/// The directory lives as long as the returned [`TempDir`].
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
#[allow(clippy::expect_used)]
pub fn temp_store() -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = FileStore::open(dir.path()).expect("open file store");
    (dir, store)
}

/// Open a cart on a clone of `store`, as a fresh page load would.
#[must_use]
pub fn reload(store: &FileStore) -> CartStore<FileStore> {
    CartStore::open(store.clone())
}

/// A product payload shaped like the catalogue API's.
#[must_use]
pub fn product(id: &str, name: &str, price: u32) -> Value {
    json!({"id": id, "name": name, "price": price, "stock": 10})
}
