//! Delivery address domain types.

use chrono::{DateTime, Utc};
use mekong_core::{AddressId, CustomerId};

/// A customer delivery address.
///
/// Invariant: whenever a customer has at least one address, exactly one of
/// them has `is_default = true`. The address service maintains this on
/// every create/update/set-default call.
#[derive(Debug, Clone)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Name of the person receiving the delivery.
    pub recipient_name: String,
    /// Contact phone for the delivery.
    pub recipient_phone: String,
    /// Street-level address line.
    pub line: String,
    /// Ward.
    pub ward: String,
    /// District.
    pub district: String,
    /// City or province; drives the shipping-fee bucket.
    pub city: String,
    /// Optional label ("Home", "Office").
    pub label: Option<String>,
    /// Whether this is the customer's default address.
    pub is_default: bool,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// Single-line rendering used in delivery snapshots and notifications.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{}, {}, {}, {}", self.line, self.ward, self.district, self.city)
    }
}

/// Input for creating an address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Name of the person receiving the delivery.
    pub recipient_name: String,
    /// Contact phone for the delivery.
    pub recipient_phone: String,
    /// Street-level address line.
    pub line: String,
    /// Ward.
    pub ward: String,
    /// District.
    pub district: String,
    /// City or province.
    pub city: String,
    /// Optional label.
    pub label: Option<String>,
    /// Requested default flag; the service may force this on for the
    /// customer's first address.
    pub is_default: bool,
}
