//! Shopping cart state.
//!
//! [`CartStore`] owns the authoritative set of cart lines for a session. Every
//! mutation is written through to the injected [`KeyValueStore`] under
//! [`keys::CART`] and then announced to subscribers as a [`CartEvent`].
//!
//! # Storage format
//!
//! ```json
//! [["7", {"product": {"id": "7", "name": "Banana Bug Bonanza", "price": 32}, "quantity": 2}]]
//! ```
//!
//! Storage failures are logged and swallowed: the in-memory cart keeps
//! working for the rest of the session.

mod events;
pub mod identity;
mod snapshot;
mod view;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sukkergris_core::{Price, ProductKey, Quantity};
use tracing::{debug, instrument, warn};

use crate::storage::{self, KeyValueStore, keys};
use crate::totals::{self, Priced};

pub use crate::observer::SubscriptionId;
pub use events::CartEvent;
pub use snapshot::{DEFAULT_PRODUCT_NAME, ProductSnapshot};
pub use view::{Availability, CartLineView, parse_shipping_date};

use crate::observer::Listeners;

/// Stored value for one product key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product data as last added.
    pub product: ProductSnapshot,
    /// Units in the cart.
    pub quantity: Quantity,
}

/// A cart line with its identity, as captured into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductKey,
    pub product: ProductSnapshot,
    pub quantity: Quantity,
}

impl Priced for CartLine {
    fn unit_price(&self) -> Price {
        self.product.price()
    }

    fn quantity(&self) -> Quantity {
        self.quantity
    }
}

/// The session's shopping cart.
///
/// Each product key appears at most once; lines keep insertion order for
/// stable display.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    entries: Vec<(ProductKey, CartEntry)>,
    listeners: Listeners<CartEvent>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart hydrated from `storage`.
    ///
    /// A missing record gives an empty cart. A malformed record is logged and
    /// also gives an empty cart; individual malformed entries are skipped.
    #[must_use]
    pub fn open(storage: S) -> Self {
        let entries = load_entries(&storage);
        debug!(lines = entries.len(), "Cart hydrated");
        Self {
            storage,
            entries,
            listeners: Listeners::default(),
        }
    }

    /// Add one unit of a product given as a JSON object.
    ///
    /// Returns the new quantity, or `None` if the payload is not an object or
    /// its identity cannot be resolved (nothing changes in that case).
    pub fn add(&mut self, product: &Value) -> Option<Quantity> {
        let Some(snapshot) = ProductSnapshot::from_value(product.clone()) else {
            debug!("Ignoring add of non-object product");
            return None;
        };
        self.add_snapshot(snapshot)
    }

    /// Add one unit of a product snapshot.
    ///
    /// If the product is already in the cart its quantity goes up by one and
    /// the stored snapshot is shallow-merged with the new one (new fields win).
    #[instrument(skip(self, product))]
    pub fn add_snapshot(&mut self, product: ProductSnapshot) -> Option<Quantity> {
        let Some(product_id) = product.key() else {
            debug!("Ignoring add of product without identity");
            return None;
        };

        let quantity = if let Some(entry) = self.entry_mut(&product_id) {
            entry.product.merge(product);
            entry.quantity = entry.quantity.increment();
            entry.quantity
        } else {
            self.entries.push((
                product_id.clone(),
                CartEntry {
                    product,
                    quantity: Quantity::ONE,
                },
            ));
            Quantity::ONE
        };

        self.persist();
        let product = self
            .entry(&product_id)
            .map(|entry| entry.product.clone())
            .unwrap_or_default();
        self.listeners.notify(&CartEvent::Added {
            product_id,
            product,
            quantity,
        });
        Some(quantity)
    }

    /// Replace the quantity of a line with `max(1, floor(quantity))`.
    ///
    /// Returns `false` (and changes nothing) if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, product_id: &ProductKey, quantity: f64) -> bool {
        self.replace_quantity(product_id, |_| Quantity::normalize(quantity))
    }

    /// Bump a line by one unit.
    pub fn increment(&mut self, product_id: &ProductKey) -> bool {
        self.replace_quantity(product_id, Quantity::increment)
    }

    /// Drop a line by one unit, never below one.
    pub fn decrement(&mut self, product_id: &ProductKey) -> bool {
        self.replace_quantity(product_id, Quantity::decrement)
    }

    fn replace_quantity(
        &mut self,
        product_id: &ProductKey,
        next: impl FnOnce(Quantity) -> Quantity,
    ) -> bool {
        let Some(entry) = self.entry_mut(product_id) else {
            debug!(%product_id, "Ignoring quantity change for product not in cart");
            return false;
        };
        let quantity = next(entry.quantity);
        entry.quantity = quantity;

        self.persist();
        self.listeners.notify(&CartEvent::QuantityChanged {
            product_id: product_id.clone(),
            quantity,
        });
        true
    }

    /// Remove a line. Returns `false` if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn remove(&mut self, product_id: &ProductKey) -> bool {
        let Some(index) = self.entries.iter().position(|(key, _)| key == product_id) else {
            debug!(%product_id, "Ignoring removal of product not in cart");
            return false;
        };
        self.entries.remove(index);

        self.persist();
        self.listeners.notify(&CartEvent::ItemRemoved {
            product_id: product_id.clone(),
        });
        true
    }

    /// Empty the cart. Returns `false` if it was already empty.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries.clear();

        self.persist();
        self.listeners.notify(&CartEvent::Cleared);
        true
    }

    /// Current lines projected for display, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<CartLineView> {
        self.entries
            .iter()
            .map(|(key, entry)| CartLineView::project(key, &entry.product, entry.quantity))
            .collect()
    }

    /// Current lines with their full snapshots.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.entries
            .iter()
            .map(|(key, entry)| CartLine {
                product_id: key.clone(),
                product: entry.product.clone(),
                quantity: entry.quantity,
            })
            .collect()
    }

    /// Subtotal of the current lines, computed fresh.
    #[must_use]
    pub fn subtotal(&self) -> rust_decimal::Decimal {
        totals::subtotal(&self.list())
    }

    /// Stored entry for a product.
    #[must_use]
    pub fn entry(&self, product_id: &ProductKey) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == product_id)
            .map(|(_, entry)| entry)
    }

    fn entry_mut(&mut self, product_id: &ProductKey) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == product_id)
            .map(|(_, entry)| entry)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total units across all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|(_, entry)| u64::from(entry.quantity.get()))
            .sum()
    }

    /// Register a listener for cart events.
    pub fn subscribe(&mut self, listener: impl FnMut(&CartEvent) + 'static) -> SubscriptionId {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The backing storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the whole cart to storage. Failures are logged, never returned.
    fn persist(&self) -> bool {
        match storage::write_json(&self.storage, keys::CART, &self.entries) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to persist cart; continuing in memory");
                false
            }
        }
    }
}

/// Read the stored cart record, tolerating damage.
fn load_entries(storage: &impl KeyValueStore) -> Vec<(ProductKey, CartEntry)> {
    let raw: Vec<Value> = match storage::read_json(storage, keys::CART) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Stored cart is unreadable; starting empty");
            return Vec::new();
        }
    };

    let mut entries: Vec<(ProductKey, CartEntry)> = Vec::with_capacity(raw.len());
    for item in raw {
        match serde_json::from_value::<(ProductKey, CartEntry)>(item) {
            Ok((key, _)) if key.as_str().is_empty() => {
                warn!("Skipping stored cart entry with empty key");
            }
            Ok((key, entry)) => {
                if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
                    existing.1 = entry;
                } else {
                    entries.push((key, entry));
                }
            }
            Err(e) => warn!(error = %e, "Skipping malformed stored cart entry"),
        }
    }
    entries
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::{Map, json};

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    /// Storage that refuses every operation.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    fn key(id: &str) -> ProductKey {
        ProductKey::new(id)
    }

    #[test]
    fn test_add_twice_merges_into_one_line() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add(&json!({"id": "7", "name": "Banana Bug Bonanza", "price": 32}));
        cart.add(&json!({"id": "7", "name": "Banana Bug Bonanza", "price": 32}));

        let lines = cart.list();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, key("7"));
        assert_eq!(lines[0].quantity.get(), 2);
        assert_eq!(lines[0].price, Price::new(Decimal::from(32)));
        assert_eq!(cart.subtotal(), Decimal::from(64));
    }

    #[test]
    fn test_add_merges_snapshot_newer_wins() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add(&json!({"id": 7, "name": "Old name", "stock": 3}));
        cart.add(&json!({"id": 7, "name": "New name", "price": 40}));
        let quantity = cart.add(&json!({"productNumber": "ignored", "id": 7, "price": 45}));

        assert_eq!(quantity.map(Quantity::get), Some(3));
        let entry = cart.entry(&key("7")).unwrap();
        assert_eq!(entry.product.name(), "New name");
        assert_eq!(entry.product.price(), Price::new(Decimal::from(45)));
        assert_eq!(entry.product.stock(), Decimal::from(3));
        assert_eq!(entry.product.get("productNumber"), Some(&json!("ignored")));
    }

    #[test]
    fn test_add_without_identity_is_noop() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());

        assert!(cart.add(&json!({"name": "Mystery"})).is_none());
        assert!(cart.add(&json!("7")).is_none());
        assert!(cart.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_quantity_normalizes() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add(&json!({"id": "7", "price": 32}));

        assert!(cart.set_quantity(&key("7"), 0.0));
        assert_eq!(cart.list()[0].quantity.get(), 1);

        assert!(cart.set_quantity(&key("7"), 2.7));
        assert_eq!(cart.list()[0].quantity.get(), 2);

        assert!(cart.set_quantity(&key("7"), -5.0));
        assert_eq!(cart.list()[0].quantity.get(), 1);
    }

    #[test]
    fn test_set_quantity_missing_is_noop() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());

        assert!(!cart.set_quantity(&key("missing-id"), 5.0));
        assert!(cart.list().is_empty());
        assert!(store.get(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add(&json!({"id": "7"}));

        assert!(cart.increment(&key("7")));
        assert!(cart.increment(&key("7")));
        assert_eq!(cart.item_count(), 3);
        assert!(cart.decrement(&key("7")));
        assert!(cart.decrement(&key("7")));
        assert!(cart.decrement(&key("7")));
        assert_eq!(cart.item_count(), 1);
        assert!(!cart.increment(&key("8")));
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());
        cart.add(&json!({"id": "7"}));
        cart.add(&json!({"id": "8"}));

        assert!(cart.remove(&key("7")));
        let stored = store.get(keys::CART).unwrap();

        assert!(!cart.remove(&key("7")));
        assert!(!cart.remove(&key("missing-id")));
        assert_eq!(store.get(keys::CART).unwrap(), stored);
        let ids: Vec<_> = cart.list().into_iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![key("8")]);
    }

    #[test]
    fn test_huge_prices_saturate_and_survive_reload() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());
        cart.add(&json!({"id": "7", "price": 1e20}));
        assert!(cart.set_quantity(&key("7"), 1e12));
        assert_eq!(cart.subtotal(), Decimal::MAX);

        cart.add(&json!({"id": "8", "price": "79228162514264337593543950335"}));
        cart.add(&json!({"id": "9", "price": "79228162514264337593543950335"}));
        assert_eq!(cart.subtotal(), Decimal::MAX);

        let reloaded = CartStore::open(store);
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.subtotal(), Decimal::MAX);
        assert_eq!(reloaded.list()[0].quantity.get(), u32::MAX);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::open(MemoryStore::new());
        assert!(!cart.clear());

        cart.add(&json!({"id": "7"}));
        assert!(cart.clear());
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_persists_pairs_format() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store.clone());
        cart.add(&json!({"id": "7", "price": 32}));
        cart.add(&json!({"id": "7", "price": 32}));

        let raw: Value = serde_json::from_str(&store.get(keys::CART).unwrap().unwrap()).unwrap();
        assert_eq!(
            raw,
            json!([["7", {"product": {"id": "7", "price": 32}, "quantity": 2}]])
        );
    }

    #[test]
    fn test_hydrates_from_storage() {
        let store = MemoryStore::new();
        store
            .set(
                keys::CART,
                r#"[["7", {"product": {"id": "7", "price": 32}, "quantity": 2}],
                    ["9", {"product": {"id": 9, "price": "79"}, "quantity": 1}]]"#,
            )
            .unwrap();

        let cart = CartStore::open(store);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(), Decimal::from(143));
    }

    #[test]
    fn test_malformed_record_gives_empty_cart() {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json").unwrap();
        assert!(CartStore::open(store).is_empty());

        let store = MemoryStore::new();
        store.set(keys::CART, r#"{"7": 2}"#).unwrap();
        assert!(CartStore::open(store).is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let store = MemoryStore::new();
        store
            .set(
                keys::CART,
                r#"[["7", {"product": {"id": "7"}, "quantity": 0}],
                    ["8", {"product": {"id": "8"}, "quantity": 1}],
                    ["", {"product": {}, "quantity": 1}],
                    "garbage"]"#,
            )
            .unwrap();

        let cart = CartStore::open(store);
        let ids: Vec<_> = cart.list().into_iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![key("8")]);
    }

    #[test]
    fn test_storage_failure_degrades_to_memory() {
        let mut cart = CartStore::open(BrokenStore);
        assert!(cart.is_empty());

        cart.add(&json!({"id": "7", "price": 32}));
        cart.add(&json!({"id": "7", "price": 32}));
        assert!(cart.set_quantity(&key("7"), 5.0));
        assert_eq!(cart.item_count(), 5);
        assert!(cart.clear());
    }

    #[test]
    fn test_events_are_emitted_for_changes_only() {
        let seen: Rc<RefCell<Vec<CartEvent>>> = Rc::default();
        let mut cart = CartStore::open(MemoryStore::new());
        let sink = Rc::clone(&seen);
        let id = cart.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        cart.add(&json!({"id": "7"}));
        cart.set_quantity(&key("7"), 3.0);
        cart.set_quantity(&key("missing"), 3.0);
        cart.remove(&key("missing"));
        cart.remove(&key("7"));
        cart.clear();

        let events = seen.borrow();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], CartEvent::Added { quantity, .. } if quantity.get() == 1));
        assert!(matches!(&events[1], CartEvent::QuantityChanged { quantity, .. } if quantity.get() == 3));
        assert!(matches!(&events[2], CartEvent::ItemRemoved { product_id } if *product_id == key("7")));
        drop(events);

        assert!(cart.unsubscribe(id));
        assert!(!cart.unsubscribe(id));
        assert_eq!(cart.listener_count(), 0);
    }

    fn snapshot_strategy() -> impl Strategy<Value = Map<String, Value>> {
        let field = prop_oneof![
            Just("name"),
            Just("price"),
            Just("stock"),
            Just("rating"),
            Just("expectedShipped"),
        ];
        let value = prop_oneof![
            (0u32..500).prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
            Just(Value::Null),
        ];
        prop::collection::vec((field, value), 0..4).prop_map(|fields| {
            let mut map: Map<String, Value> = fields
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect();
            map.insert("id".into(), json!("7"));
            map
        })
    }

    proptest! {
        #[test]
        fn repeated_adds_count_and_merge(
            snapshots in prop::collection::vec(snapshot_strategy(), 1..12),
        ) {
            let store = MemoryStore::new();
            let mut cart = CartStore::open(store.clone());
            let mut expected = Map::new();
            for snapshot in &snapshots {
                cart.add(&Value::Object(snapshot.clone()));
                expected.extend(snapshot.clone());
            }

            let count = u32::try_from(snapshots.len()).unwrap();
            let entry = cart.entry(&key("7")).unwrap();
            prop_assert_eq!(cart.len(), 1);
            prop_assert_eq!(entry.quantity.get(), count);
            prop_assert_eq!(entry.product.as_map(), &expected);

            let reloaded = CartStore::open(store);
            prop_assert_eq!(reloaded.lines(), cart.lines());
        }
    }
}
