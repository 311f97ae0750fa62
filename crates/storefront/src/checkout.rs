//! Checkout flow: `Draft -> Validated -> Placed`.
//!
//! While in `Draft` the form and shipping selection can change and totals are
//! recomputed on every read. [`Checkout::submit`] validates; on failure the
//! checkout stays in `Draft` and nothing is written. On success the order is
//! written to `lastOrder`, appended to the orders log, the cart is cleared,
//! and subscribers receive [`CheckoutEvent::OrderPlaced`].

use chrono::Utc;
use sukkergris_core::{
    CheckoutPhase, Email, EmailError, OrderNumber, Price, ShippingId, ShippingOption,
};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::cart::CartStore;
use crate::observer::{Listeners, SubscriptionId};
use crate::orders::{CustomerInfo, Order, OrderLog};
use crate::storage::{self, KeyValueStore, keys};
use crate::totals::Totals;

/// A single reason a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("please enter your name")]
    MissingName,
    #[error("please enter your email")]
    MissingEmail,
    #[error("invalid email: {0}")]
    InvalidEmail(EmailError),
    #[error("please enter your address")]
    MissingAddress,
    #[error("please choose a shipping method")]
    MissingShipping,
}

/// Errors returned by checkout operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The submission failed validation. Every failed check is listed.
    #[error("checkout is incomplete: {}", join_issues(.0))]
    Invalid(Vec<ValidationIssue>),

    /// The shipping id is not one of the offered options.
    #[error("unknown shipping option: {0}")]
    UnknownShipping(ShippingId),

    /// The order was already placed; this checkout is closed.
    #[error("order already placed")]
    AlreadyPlaced,

    /// The checkout cannot move from `from` to `to`.
    #[error("checkout cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: CheckoutPhase,
        to: CheckoutPhase,
    },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CheckoutError {
    /// Whether `issue` is among the reported validation failures.
    #[must_use]
    pub fn has_issue(&self, issue: &ValidationIssue) -> bool {
        matches!(self, Self::Invalid(issues) if issues.contains(issue))
    }
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub zip: String,
}

/// Rules that vary between storefront deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutPolicy {
    /// Refuse orders without a street address.
    pub require_address: bool,
}

/// Emitted by [`Checkout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// An order was placed and persisted.
    OrderPlaced { order: Order },
}

/// One checkout session.
#[derive(Debug)]
pub struct Checkout {
    options: Vec<ShippingOption>,
    policy: CheckoutPolicy,
    form: CheckoutForm,
    shipping: Option<ShippingOption>,
    phase: CheckoutPhase,
    listeners: Listeners<CheckoutEvent>,
}

impl Checkout {
    /// Start a checkout offering `options`.
    #[must_use]
    pub fn new(options: Vec<ShippingOption>, policy: CheckoutPolicy) -> Self {
        Self {
            options,
            policy,
            form: CheckoutForm::default(),
            shipping: None,
            phase: CheckoutPhase::Draft,
            listeners: Listeners::default(),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Shipping options on offer.
    #[must_use]
    pub fn options(&self) -> &[ShippingOption] {
        &self.options
    }

    /// The selected shipping option, if any.
    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingOption> {
        self.shipping.as_ref()
    }

    /// Current form input.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    fn transition(&mut self, next: CheckoutPhase) -> Result<(), CheckoutError> {
        if !self.phase.can_transition_to(next) {
            return Err(CheckoutError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        debug!(from = ?self.phase, to = ?next, "Checkout phase changed");
        self.phase = next;
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), CheckoutError> {
        if self.phase.is_editable() {
            Ok(())
        } else {
            Err(CheckoutError::AlreadyPlaced)
        }
    }

    /// Replace the form input.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadyPlaced`] once the order is placed.
    pub fn update_form(&mut self, form: CheckoutForm) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.form = form;
        Ok(())
    }

    /// Select a shipping option by id.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownShipping`] if the id is not offered, or
    /// [`CheckoutError::AlreadyPlaced`] once the order is placed.
    pub fn select_shipping(&mut self, id: &ShippingId) -> Result<&ShippingOption, CheckoutError> {
        self.ensure_editable()?;
        let option = self
            .options
            .iter()
            .find(|option| option.id == *id)
            .cloned()
            .ok_or_else(|| CheckoutError::UnknownShipping(id.clone()))?;
        let selected: &ShippingOption = self.shipping.insert(option);
        Ok(selected)
    }

    /// Fresh totals for the cart and the current shipping selection.
    #[must_use]
    pub fn totals<S: KeyValueStore>(&self, cart: &CartStore<S>) -> Totals {
        Totals::compute(&cart.list(), self.shipping.as_ref())
    }

    /// Register a listener for checkout events.
    pub fn subscribe(&mut self, listener: impl FnMut(&CheckoutEvent) + 'static) -> SubscriptionId {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Check the form, shipping and cart without changing anything.
    ///
    /// # Errors
    ///
    /// Returns every failed check as [`CheckoutError::Invalid`].
    pub fn validate<S: KeyValueStore>(
        &self,
        cart: &CartStore<S>,
    ) -> Result<(CustomerInfo, ShippingOption), CheckoutError> {
        let mut issues = Vec::new();

        if cart.is_empty() {
            issues.push(ValidationIssue::EmptyCart);
        }

        let name = self.form.name.trim();
        if name.is_empty() {
            issues.push(ValidationIssue::MissingName);
        }

        let email = if self.form.email.trim().is_empty() {
            issues.push(ValidationIssue::MissingEmail);
            None
        } else {
            Email::parse(&self.form.email)
                .map_err(|e| issues.push(ValidationIssue::InvalidEmail(e)))
                .ok()
        };

        let address = non_empty(&self.form.address);
        if self.policy.require_address && address.is_none() {
            issues.push(ValidationIssue::MissingAddress);
        }

        if self.shipping.is_none() {
            issues.push(ValidationIssue::MissingShipping);
        }

        match (email, self.shipping.clone()) {
            (Some(email), Some(shipping)) if issues.is_empty() => Ok((
                CustomerInfo {
                    name: name.to_owned(),
                    email,
                    address,
                    phone: non_empty(&self.form.phone),
                    city: non_empty(&self.form.city),
                    zip: non_empty(&self.form.zip),
                },
                shipping,
            )),
            _ => Err(CheckoutError::Invalid(issues)),
        }
    }

    /// Validate and place the order.
    ///
    /// On success the order is written to `lastOrder`, appended to the orders
    /// log and the cart is cleared. Storage failures while persisting are
    /// logged; the order is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Invalid`] (phase stays `Draft`, cart untouched)
    /// or [`CheckoutError::AlreadyPlaced`].
    #[instrument(skip(self, cart))]
    pub fn submit<S: KeyValueStore>(
        &mut self,
        cart: &mut CartStore<S>,
    ) -> Result<Order, CheckoutError> {
        self.ensure_editable()?;

        let (customer, shipping) = match self.validate(cart) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Checkout validation failed");
                return Err(e);
            }
        };
        self.transition(CheckoutPhase::Validated)?;

        let lines = cart.lines();
        let totals = Totals::compute(&lines, Some(&shipping));
        let order = Order {
            order_number: OrderNumber::generate(),
            order_date: Utc::now(),
            customer,
            shipping,
            lines,
            subtotal: Price::new(totals.subtotal),
            total: Price::new(totals.total),
        };

        self.transition(CheckoutPhase::Placed)?;
        persist_order(cart.storage(), &order);
        cart.clear();
        info!(
            order_number = %order.order_number,
            total = %order.total.amount(),
            "Order placed"
        );

        self.listeners.notify(&CheckoutEvent::OrderPlaced {
            order: order.clone(),
        });
        Ok(order)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn persist_order(storage: &impl KeyValueStore, order: &Order) {
    if let Err(e) = storage::write_json(storage, keys::LAST_ORDER, order) {
        error!(error = %e, "Failed to store last order");
    }
    if let Err(e) = OrderLog::new(storage).append(order) {
        error!(error = %e, "Failed to append to orders log");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::orders::last_order;
    use crate::storage::MemoryStore;

    fn options() -> Vec<ShippingOption> {
        vec![
            ShippingOption::new("pickup", "Pick up", Decimal::ZERO).unwrap(),
            ShippingOption::new("mail", "Mail", Decimal::from(39)).unwrap(),
        ]
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Kari Nordmann".into(),
            email: "kari@example.no".into(),
            address: "Storgata 1".into(),
            ..CheckoutForm::default()
        }
    }

    fn filled_cart(store: &MemoryStore) -> CartStore<MemoryStore> {
        let mut cart = CartStore::open(store.clone());
        cart.add(&json!({"id": "7", "name": "Banana Bug Bonanza", "price": 32}));
        cart.add(&json!({"id": "7", "name": "Banana Bug Bonanza", "price": 32}));
        cart.add(&json!({"id": "9", "name": "Sour Snakes", "price": 79}));
        cart
    }

    #[test]
    fn test_totals_follow_shipping_selection() {
        let store = MemoryStore::new();
        let cart = filled_cart(&store);
        let mut checkout = Checkout::new(options(), CheckoutPolicy::default());

        assert_eq!(checkout.totals(&cart).total, Decimal::from(143));
        checkout.select_shipping(&"mail".into()).unwrap();
        let totals = checkout.totals(&cart);
        assert_eq!(totals.subtotal, Decimal::from(143));
        assert_eq!(totals.total, Decimal::from(182));
    }

    #[test]
    fn test_phase_transitions_are_guarded() {
        let mut checkout = Checkout::new(options(), CheckoutPolicy::default());
        assert_eq!(
            checkout.transition(CheckoutPhase::Placed),
            Err(CheckoutError::InvalidTransition {
                from: CheckoutPhase::Draft,
                to: CheckoutPhase::Placed,
            })
        );
        assert_eq!(checkout.phase(), CheckoutPhase::Draft);

        checkout.transition(CheckoutPhase::Validated).unwrap();
        checkout.transition(CheckoutPhase::Placed).unwrap();
        assert!(checkout.transition(CheckoutPhase::Draft).is_err());
        assert_eq!(checkout.phase(), CheckoutPhase::Placed);
    }

    #[test]
    fn test_unknown_shipping() {
        let mut checkout = Checkout::new(options(), CheckoutPolicy::default());
        let result = checkout.select_shipping(&"drone".into());
        assert!(matches!(result, Err(CheckoutError::UnknownShipping(_))));
        assert!(checkout.shipping().is_none());
    }

    #[test]
    fn test_empty_name_is_rejected_without_side_effects() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let mut checkout = Checkout::new(options(), CheckoutPolicy::default());
        checkout
            .update_form(CheckoutForm {
                name: "   ".into(),
                ..form()
            })
            .unwrap();
        checkout.select_shipping(&"mail".into()).unwrap();

        let err = checkout.submit(&mut cart).unwrap_err();
        assert!(err.has_issue(&ValidationIssue::MissingName));
        assert_eq!(checkout.phase(), CheckoutPhase::Draft);
        assert_eq!(cart.item_count(), 3);
        assert!(last_order(&store).is_none());
        assert!(store.get(keys::ORDERS).unwrap().is_none());
    }

    #[test]
    fn test_reports_every_issue() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(store);
        let mut checkout = Checkout::new(options(), CheckoutPolicy { require_address: true });

        let err = checkout.submit(&mut cart).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::Invalid(vec![
                ValidationIssue::EmptyCart,
                ValidationIssue::MissingName,
                ValidationIssue::MissingEmail,
                ValidationIssue::MissingAddress,
                ValidationIssue::MissingShipping,
            ])
        );
    }

    #[test]
    fn test_invalid_email() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let mut checkout = Checkout::new(options(), CheckoutPolicy::default());
        checkout
            .update_form(CheckoutForm {
                email: "kari.example.no".into(),
                ..form()
            })
            .unwrap();
        checkout.select_shipping(&"pickup".into()).unwrap();

        let err = checkout.submit(&mut cart).unwrap_err();
        assert!(err.has_issue(&ValidationIssue::InvalidEmail(EmailError::AtSymbol)));
    }

    #[test]
    fn test_place_order() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let mut checkout = Checkout::new(options(), CheckoutPolicy::default());
        let placed: Rc<RefCell<Vec<CheckoutEvent>>> = Rc::default();
        let sink = Rc::clone(&placed);
        checkout.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        checkout.update_form(form()).unwrap();
        checkout.select_shipping(&"mail".into()).unwrap();
        let order = checkout.submit(&mut cart).unwrap();

        assert_eq!(checkout.phase(), CheckoutPhase::Placed);
        assert_eq!(order.subtotal.amount(), Decimal::from(143));
        assert_eq!(order.total.amount(), Decimal::from(182));
        assert_eq!(order.lines.len(), 2);
        assert!(order.totals_consistent());
        assert_eq!(order.customer.address.as_deref(), Some("Storgata 1"));
        assert_eq!(order.customer.phone, None);

        assert!(cart.is_empty());
        assert_eq!(last_order(&store), Some(order.clone()));
        assert_eq!(OrderLog::new(&store).count().unwrap(), 1);
        assert_eq!(placed.borrow().len(), 1);

        assert_eq!(checkout.submit(&mut cart), Err(CheckoutError::AlreadyPlaced));
        assert_eq!(
            checkout.update_form(form()),
            Err(CheckoutError::AlreadyPlaced)
        );
    }
}
