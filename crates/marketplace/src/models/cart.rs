//! Cart domain types.

use chrono::{DateTime, Utc};
use mekong_core::{CartId, CartLineId, CustomerId, ProductId, SelectedOption};

/// A customer's cart.
///
/// Created lazily on first access and never deleted: checkout drains the
/// lines but leaves the cart in place for the next purchase.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning customer. Exactly one cart exists per customer.
    pub customer_id: CustomerId,
    /// Lines in the order they were added.
    pub lines: Vec<CartLine>,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last modified.
    pub updated_at: DateTime<Utc>,
}

/// One line in a cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartLineId,
    /// Weak reference to the catalog product; the product may change after
    /// the line was added.
    pub product_id: ProductId,
    /// Number of units. Always >= 1.
    pub quantity: u32,
    /// Options chosen at add time, stored as the canonical serialized blob.
    /// Copied verbatim into the line item at checkout.
    pub selected_options_json: String,
    /// When the line was added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Decode the stored options blob.
    ///
    /// A blob that fails to decode is treated as "no options" so a single
    /// bad row cannot wedge the whole cart; the caller logs the condition.
    #[must_use]
    pub fn selected_options(&self) -> Vec<SelectedOption> {
        mekong_core::decode_options(&self.selected_options_json).unwrap_or_else(|error| {
            tracing::warn!(line_id = %self.id, %error, "dropping undecodable options blob");
            Vec::new()
        })
    }
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone)]
pub struct NewCartLine {
    /// Product being added.
    pub product_id: ProductId,
    /// Number of units. Validated >= 1 before the store is called.
    pub quantity: u32,
    /// Canonical serialized options blob.
    pub selected_options_json: String,
}
