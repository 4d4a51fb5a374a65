//! Status enums and the fulfillment state machine.
//!
//! A [`FulfillmentStatus`] tracks one vendor's portion of an order through
//! the delivery lifecycle. The aggregate [`OrderStatus`] is never set
//! directly by callers: it is derived from the multiset of unit statuses
//! via [`OrderStatus::derive`].

use serde::{Deserialize, Serialize};

/// Status of a single vendor fulfillment unit.
///
/// The happy path is linear: `PENDING -> COOKING -> READY -> PICKED_UP ->
/// DELIVERED`. `CANCELLED` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
    PickedUp,
    Delivered,
    Cancelled,
}

impl FulfillmentStatus {
    /// Whether no further transitions are possible from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether a unit may move from this status to `next`.
    ///
    /// Legal edges are the linear happy path plus cancellation from any
    /// non-terminal state. Backward moves and skips are rejected.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Cooking)
                | (Self::Cooking, Self::Ready)
                | (Self::Ready, Self::PickedUp)
                | (Self::PickedUp, Self::Delivered)
        ) || (!self.is_terminal() && matches!(next, Self::Cancelled))
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Cooking => "COOKING",
            Self::Ready => "READY",
            Self::PickedUp => "PICKED_UP",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{name}")
    }
}

/// Status of a customer-facing aggregate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Derive the aggregate order status from its units' statuses.
    ///
    /// Pure single-pass fold over the status multiset, evaluated in
    /// precedence order:
    ///
    /// 1. all units delivered -> `Completed`
    /// 2. all units cancelled -> `Cancelled`
    /// 3. any unit picked up -> `Delivering`
    /// 4. any unit ready -> `Ready`
    /// 5. any unit cooking -> `Preparing`
    /// 6. otherwise -> `Confirmed` (mixed pending / partially-cancelled sets)
    #[must_use]
    pub fn derive<I>(unit_statuses: I) -> Self
    where
        I: IntoIterator<Item = FulfillmentStatus>,
    {
        let mut total = 0_usize;
        let mut delivered = 0_usize;
        let mut cancelled = 0_usize;
        let mut any_picked_up = false;
        let mut any_ready = false;
        let mut any_cooking = false;

        for status in unit_statuses {
            total += 1;
            match status {
                FulfillmentStatus::Delivered => delivered += 1,
                FulfillmentStatus::Cancelled => cancelled += 1,
                FulfillmentStatus::PickedUp => any_picked_up = true,
                FulfillmentStatus::Ready => any_ready = true,
                FulfillmentStatus::Cooking => any_cooking = true,
                FulfillmentStatus::Pending => {}
            }
        }

        // An order always has at least one unit; an empty set stays Pending.
        if total == 0 {
            return Self::Pending;
        }

        if delivered == total {
            Self::Completed
        } else if cancelled == total {
            Self::Cancelled
        } else if any_picked_up {
            Self::Delivering
        } else if any_ready {
            Self::Ready
        } else if any_cooking {
            Self::Preparing
        } else {
            Self::Confirmed
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivering => "DELIVERING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{name}")
    }
}
