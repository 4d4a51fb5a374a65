//! Order, fulfillment-unit, and line-item domain types.
//!
//! Orders are assembled once at checkout and thereafter append-only except
//! for the status fields, which move only through the state machine in
//! `mekong_core::types::status`.

use chrono::{DateTime, Utc};
use mekong_core::{
    CustomerId, FulfillmentStatus, FulfillmentUnitId, LineItemId, OrderId, OrderStatus, ProductId,
    VendorId,
};
use rust_decimal::Decimal;

/// Delivery details frozen into the order at checkout.
#[derive(Debug, Clone)]
pub struct DeliveryDetails {
    /// Recipient name from the chosen address.
    pub recipient_name: String,
    /// Recipient phone from the chosen address.
    pub recipient_phone: String,
    /// Single-line formatted address.
    pub address: String,
}

/// A customer-facing aggregate order spanning all vendors in one checkout.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Globally unique human-readable number, e.g. `ORD2026080600042`.
    /// Numbering root for the order's units.
    pub order_number: String,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Customer display name at checkout time.
    pub customer_name: String,
    /// Derived aggregate status.
    pub status: OrderStatus,
    /// Sum of all line subtotals across all units, before shipping.
    pub total_amount: Decimal,
    /// Shipping fee computed at checkout.
    pub shipping_fee: Decimal,
    /// Payment-method tag recorded as-is; settlement happens elsewhere.
    pub payment_method: String,
    /// Delivery snapshot.
    pub delivery: DeliveryDetails,
    /// Free-form customer notes.
    pub notes: Option<String>,
    /// Per-vendor fulfillment units in stable vendor-first-seen order.
    pub units: Vec<FulfillmentUnit>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order (or any of its units) last changed.
    pub updated_at: DateTime<Utc>,
}

/// One vendor's portion of an order, tracked independently.
#[derive(Debug, Clone)]
pub struct FulfillmentUnit {
    /// Unique unit ID.
    pub id: FulfillmentUnitId,
    /// Parent order.
    pub order_id: OrderId,
    /// Vendor responsible for this unit.
    pub vendor_id: VendorId,
    /// Vendor store name at checkout time.
    pub vendor_name: String,
    /// `orderNumber + "-" + suffix`, e.g. `ORD2026080600042-B`.
    pub unit_number: String,
    /// Sum of this unit's line subtotals, fixed at creation.
    pub subtotal: Decimal,
    /// Current lifecycle status.
    pub status: FulfillmentStatus,
    /// Line items in cart order.
    pub items: Vec<LineItem>,
    /// When the unit was created.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

/// An immutable priced line within a fulfillment unit.
#[derive(Debug, Clone)]
pub struct LineItem {
    /// Unique line-item ID.
    pub id: LineItemId,
    /// Product the line was created from. Weak reference; the snapshot
    /// fields below are authoritative for this order.
    pub product_id: ProductId,
    /// Product name at checkout time.
    pub product_name: String,
    /// Number of units.
    pub quantity: u32,
    /// Unit price at checkout (base price plus option adjustments).
    pub price: Decimal,
    /// Serialized options blob copied verbatim from the cart line.
    pub selected_options_json: String,
}

impl LineItem {
    /// This line's contribution to the unit subtotal.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Input for persisting a fully assembled order atomically.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Pre-generated globally unique order number.
    pub order_number: String,
    /// Customer placing the order.
    pub customer_id: CustomerId,
    /// Customer display name snapshot.
    pub customer_name: String,
    /// Sum of all line subtotals.
    pub total_amount: Decimal,
    /// Computed shipping fee.
    pub shipping_fee: Decimal,
    /// Payment-method tag.
    pub payment_method: String,
    /// Delivery snapshot.
    pub delivery: DeliveryDetails,
    /// Free-form customer notes.
    pub notes: Option<String>,
    /// Units in stable vendor-first-seen order.
    pub units: Vec<NewFulfillmentUnit>,
}

/// Input for one unit of a [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewFulfillmentUnit {
    /// Vendor responsible for this unit.
    pub vendor_id: VendorId,
    /// Vendor store name snapshot.
    pub vendor_name: String,
    /// Pre-generated unit number.
    pub unit_number: String,
    /// Sum of this unit's line subtotals.
    pub subtotal: Decimal,
    /// Line items in cart order.
    pub items: Vec<NewLineItem>,
}

/// Input for one line item of a [`NewFulfillmentUnit`].
#[derive(Debug, Clone)]
pub struct NewLineItem {
    /// Originating product.
    pub product_id: ProductId,
    /// Product name snapshot.
    pub product_name: String,
    /// Number of units.
    pub quantity: u32,
    /// Unit price at checkout.
    pub price: Decimal,
    /// Options blob copied from the cart line.
    pub selected_options_json: String,
}
