//! Status enums for the checkout flow.

use serde::{Deserialize, Serialize};

/// Phase of a checkout.
///
/// `Draft -> Validated -> Placed`. A failed validation falls back to
/// `Draft`; `Placed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Lines and shipping are still editable.
    #[default]
    Draft,
    /// Submission passed validation and the order is being built.
    Validated,
    /// The order has been persisted.
    Placed,
}

impl CheckoutPhase {
    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Validated) | (Self::Validated, Self::Draft | Self::Placed)
        )
    }

    /// Whether the checkout can still be edited.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }
}
