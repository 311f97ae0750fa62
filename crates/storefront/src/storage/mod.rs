//! Durable key-value storage.
//!
//! The cart, the last placed order and the orders log are stored as JSON text
//! under fixed keys (see [`keys`]). The store itself is injected, so the same
//! cart code runs against [`MemoryStore`] in tests and [`FileStore`] on disk.
//!
//! Adapters report failures as [`StorageError`]. Callers in this crate absorb
//! them and keep working from memory.

mod file;
mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage keys shared with the admin views.
pub mod keys {
    /// Cart record: array of `[productId, {product, quantity}]` pairs.
    pub const CART: &str = "sukkergrisCart";

    /// The most recently placed order, read by the confirmation page.
    pub const LAST_ORDER: &str = "lastOrder";

    /// Append-only log of placed orders, read by the admin orders view.
    pub const ORDERS: &str = "orders";
}

/// Errors raised by a storage adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded as JSON.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backing medium.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string key-value store.
///
/// Writes complete before the call returns, so a read after a write in the
/// same session always sees the written value.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns an error if the read fails or the stored text is not valid JSON
/// for `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
