//! Placed orders.
//!
//! An [`Order`] is built once at checkout and never changes afterwards. It is
//! written to [`keys::LAST_ORDER`] for the confirmation page and appended to
//! [`keys::ORDERS`], which the admin orders view lists and prunes through
//! [`OrderLog`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sukkergris_core::{Email, OrderNumber, Price, Quantity, ShippingOption};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::cart::CartLine;
use crate::format;
use crate::storage::{self, KeyValueStore, StorageError, keys};
use crate::totals;

/// Customer details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: OrderNumber,
    pub order_date: DateTime<Utc>,
    pub customer: CustomerInfo,
    pub shipping: ShippingOption,
    pub lines: Vec<CartLine>,
    pub subtotal: Price,
    pub total: Price,
}

impl Order {
    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Whether the stored totals agree with the lines and shipping.
    #[must_use]
    pub fn totals_consistent(&self) -> bool {
        let subtotal = totals::subtotal(&self.lines);
        subtotal == self.subtotal.amount()
            && totals::grand_total(subtotal, Some(&self.shipping)) == self.total.amount()
    }
}

/// Read the order written by the last successful checkout.
///
/// A missing or malformed record yields `None`.
#[must_use]
pub fn last_order(storage: &impl KeyValueStore) -> Option<Order> {
    storage::read_json(storage, keys::LAST_ORDER)
        .inspect_err(|e| warn!(error = %e, "Stored last order is unreadable"))
        .ok()
        .flatten()
}

/// One item row on the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationItem {
    pub product_id: String,
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: String,
    pub line_total: String,
}

/// Text shown on the order confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub customer_phone: String,
    pub shipping_method: String,
    pub items: Vec<ConfirmationItem>,
    pub total: String,
}

impl Confirmation {
    /// Project an order for display, formatting money with `suffix`.
    #[must_use]
    pub fn from_order(order: &Order, suffix: &str) -> Self {
        let address = [&order.customer.address, &order.customer.city, &order.customer.zip]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            order_number: format!("#{}", order.order_number),
            customer_name: order.customer.name.clone(),
            customer_email: order.customer.email.to_string(),
            customer_address: if address.is_empty() { "-".to_owned() } else { address },
            customer_phone: order
                .customer
                .phone
                .clone()
                .filter(|phone| !phone.is_empty())
                .unwrap_or_else(|| "-".to_owned()),
            shipping_method: order.shipping.id.to_string(),
            items: order
                .lines
                .iter()
                .map(|line| ConfirmationItem {
                    product_id: line.product_id.to_string(),
                    name: line.product.name().to_owned(),
                    quantity: line.quantity,
                    unit_price: format::money(line.product.price().amount(), suffix),
                    line_total: format::money(totals::line_total(line), suffix),
                })
                .collect(),
            total: format::money(order.total.amount(), suffix),
        }
    }
}

/// Errors from the admin orders log.
#[derive(Debug, Error)]
pub enum OrderLogError {
    /// The log could not be read or written.
    #[error("orders log storage error: {0}")]
    Storage(#[from] StorageError),

    /// No order with this number exists.
    #[error("order not found: {0}")]
    NotFound(OrderNumber),
}

/// The durable log of placed orders.
///
/// The log is stored as raw JSON records so entries written by other tools
/// (which may not match [`Order`]) survive a delete of a different order.
#[derive(Debug)]
pub struct OrderLog<S> {
    storage: S,
}

impl<S: KeyValueStore> OrderLog<S> {
    /// Open the log on `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    fn records(&self) -> Result<Vec<Value>, StorageError> {
        match storage::read_json::<Vec<Value>>(&self.storage, keys::ORDERS) {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(StorageError::Serialize(e)) => {
                warn!(error = %e, "Orders log is malformed; treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Append an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or written.
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    pub fn append(&self, order: &Order) -> Result<(), OrderLogError> {
        let mut records = self.records()?;
        records.push(serde_json::to_value(order).map_err(StorageError::from)?);
        storage::write_json(&self.storage, keys::ORDERS, &records)?;
        Ok(())
    }

    /// All readable orders, newest first.
    ///
    /// Records that do not parse as an [`Order`] are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn list(&self) -> Result<Vec<Order>, OrderLogError> {
        let mut orders: Vec<Order> = self
            .records()?
            .into_iter()
            .filter_map(|record| {
                serde_json::from_value(record)
                    .inspect_err(|e| warn!(error = %e, "Skipping unreadable order record"))
                    .ok()
            })
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    /// Number of records in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn count(&self) -> Result<usize, OrderLogError> {
        Ok(self.records()?.len())
    }

    /// Delete every record with `order_number`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderLogError::NotFound`] if no record matches, or a storage
    /// error if the log cannot be read or written.
    #[instrument(skip(self))]
    pub fn delete(&self, order_number: &OrderNumber) -> Result<(), OrderLogError> {
        let records = self.records()?;
        let before = records.len();
        let kept: Vec<Value> = records
            .into_iter()
            .filter(|record| {
                record.get("orderNumber").and_then(Value::as_str) != Some(order_number.as_str())
            })
            .collect();
        if kept.len() == before {
            return Err(OrderLogError::NotFound(order_number.clone()));
        }
        storage::write_json(&self.storage, keys::ORDERS, &kept)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::cart::ProductSnapshot;
    use crate::storage::MemoryStore;

    fn order(number: &str, day: u32) -> Order {
        let product =
            ProductSnapshot::from_value(json!({"id": "7", "name": "Banana Bug Bonanza", "price": 32}))
                .unwrap();
        Order {
            order_number: OrderNumber::new(number),
            order_date: Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap(),
            customer: CustomerInfo {
                name: "Kari Nordmann".into(),
                email: Email::parse("kari@example.no").unwrap(),
                address: Some("Storgata 1".into()),
                phone: None,
                city: Some("Halden".into()),
                zip: Some("1771".into()),
            },
            shipping: ShippingOption::new("mail", "Mail", Decimal::from(39)).unwrap(),
            lines: vec![CartLine {
                product_id: "7".into(),
                product,
                quantity: Quantity::new(2).unwrap(),
            }],
            subtotal: Price::new(Decimal::from(64)),
            total: Price::new(Decimal::from(103)),
        }
    }

    #[test]
    fn test_order_json_shape() {
        let value = serde_json::to_value(order("SG-1", 1)).unwrap();
        assert_eq!(value["orderNumber"], json!("SG-1"));
        assert_eq!(value["customer"]["email"], json!("kari@example.no"));
        assert_eq!(value["shipping"]["id"], json!("mail"));
        assert_eq!(value["lines"][0]["productId"], json!("7"));
        assert_eq!(value["lines"][0]["quantity"], json!(2));
        assert!(value["total"].is_number());
        assert!(value["customer"].get("phone").is_none());
    }

    #[test]
    fn test_totals_consistent() {
        let mut placed = order("SG-1", 1);
        assert!(placed.totals_consistent());
        assert_eq!(placed.item_count(), 2);
        placed.total = Price::new(Decimal::from(100));
        assert!(!placed.totals_consistent());
    }

    #[test]
    fn test_confirmation_projection() {
        let confirmation = Confirmation::from_order(&order("SG-1", 1), "kr");
        assert_eq!(confirmation.order_number, "#SG-1");
        assert_eq!(confirmation.customer_address, "Storgata 1, Halden, 1771");
        assert_eq!(confirmation.customer_phone, "-");
        assert_eq!(confirmation.shipping_method, "mail");
        assert_eq!(confirmation.items[0].unit_price, "32.00 kr");
        assert_eq!(confirmation.items[0].line_total, "64.00 kr");
        assert_eq!(confirmation.total, "103.00 kr");
    }

    #[test]
    fn test_last_order_tolerates_garbage() {
        let store = MemoryStore::new();
        assert!(last_order(&store).is_none());
        store.set(keys::LAST_ORDER, "nope").unwrap();
        assert!(last_order(&store).is_none());
    }

    #[test]
    fn test_log_lists_newest_first() {
        let log = OrderLog::new(MemoryStore::new());
        log.append(&order("SG-OLD", 1)).unwrap();
        log.append(&order("SG-NEW", 9)).unwrap();
        log.append(&order("SG-MID", 5)).unwrap();

        let numbers: Vec<String> = log
            .list()
            .unwrap()
            .into_iter()
            .map(|o| o.order_number.into_inner())
            .collect();
        assert_eq!(numbers, ["SG-NEW", "SG-MID", "SG-OLD"]);
        assert_eq!(log.count().unwrap(), 3);
    }

    #[test]
    fn test_log_delete() {
        let log = OrderLog::new(MemoryStore::new());
        log.append(&order("SG-1", 1)).unwrap();
        log.append(&order("SG-2", 2)).unwrap();

        log.delete(&OrderNumber::new("SG-1")).unwrap();
        assert_eq!(log.count().unwrap(), 1);
        assert!(matches!(
            log.delete(&OrderNumber::new("SG-1")),
            Err(OrderLogError::NotFound(_))
        ));
    }

    #[test]
    fn test_log_keeps_foreign_records() {
        let store = MemoryStore::new();
        store
            .set(keys::ORDERS, r#"[{"orderNumber": "LEGACY", "items": []}]"#)
            .unwrap();
        let log = OrderLog::new(store);
        log.append(&order("SG-1", 1)).unwrap();

        assert_eq!(log.count().unwrap(), 2);
        assert_eq!(log.list().unwrap().len(), 1);
        log.delete(&OrderNumber::new("SG-1")).unwrap();
        assert_eq!(log.count().unwrap(), 1);
    }

    #[test]
    fn test_malformed_log_is_empty() {
        let store = MemoryStore::new();
        store.set(keys::ORDERS, "{oops").unwrap();
        let log = OrderLog::new(store);
        assert!(log.list().unwrap().is_empty());
    }
}
