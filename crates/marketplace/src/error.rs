//! Error taxonomy for the marketplace workflow.
//!
//! Validation, not-found, and permission failures are rejected before any
//! mutation; store failures abort the whole operation. Notification
//! delivery failures are deliberately absent here: they are caught and
//! logged at the dispatch site and never reach callers.

use thiserror::Error;

use mekong_core::FulfillmentStatus;

use crate::stores::StoreError;

/// Workflow-level error returned by the services.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Checkout was attempted on a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Request rejected before any mutation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller does not own the targeted resource.
    #[error("permission denied: {0}")]
    Permission(&'static str),

    /// The requested fulfillment status change is not a legal edge of the
    /// state machine.
    #[error("fulfillment status cannot change from {from} to {to}")]
    InvalidTransition {
        /// Status the unit currently holds.
        from: FulfillmentStatus,
        /// Status the caller asked for.
        to: FulfillmentStatus,
    },

    /// A store collaborator failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for [`MarketplaceError`].
pub type Result<T> = std::result::Result<T, MarketplaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(MarketplaceError::EmptyCart.to_string(), "cart is empty");
        assert_eq!(
            MarketplaceError::NotFound("address").to_string(),
            "address not found"
        );
        assert_eq!(
            MarketplaceError::InvalidTransition {
                from: FulfillmentStatus::Delivered,
                to: FulfillmentStatus::Pending,
            }
            .to_string(),
            "fulfillment status cannot change from DELIVERED to PENDING"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let error = MarketplaceError::from(StoreError::NotFound);
        assert!(matches!(error, MarketplaceError::Store(StoreError::NotFound)));
    }
}
