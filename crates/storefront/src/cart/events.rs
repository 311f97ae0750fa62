//! Cart change notifications.

use sukkergris_core::{ProductKey, Quantity};

use super::ProductSnapshot;

/// Something changed in the cart. Emitted after the change is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added or its quantity bumped by an add.
    Added {
        product_id: ProductKey,
        product: ProductSnapshot,
        quantity: Quantity,
    },
    /// A line quantity was replaced.
    QuantityChanged {
        product_id: ProductKey,
        quantity: Quantity,
    },
    /// A line was removed.
    ItemRemoved { product_id: ProductKey },
    /// Every line was removed.
    Cleared,
}
