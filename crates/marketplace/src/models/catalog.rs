//! Catalog and account types referenced by carts and orders.
//!
//! Customers, vendors, and products are managed elsewhere; the workflow
//! only ever reads them by ID and snapshots the fields it needs.

use mekong_core::{CustomerId, ProductId, VendorId};
use rust_decimal::Decimal;

/// A customer account (read-only view).
#[derive(Debug, Clone)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Display name, snapshotted into orders and vendor notifications.
    pub full_name: String,
}

/// A vendor storefront (read-only view).
#[derive(Debug, Clone)]
pub struct Vendor {
    /// Unique vendor ID.
    pub id: VendorId,
    /// Store display name, snapshotted into fulfillment units.
    pub store_name: String,
}

/// A catalog product (read-only view).
///
/// Cart lines reference products weakly; the price here is the live base
/// price and is only frozen into a line item at checkout.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Vendor who owns and fulfills this product.
    pub vendor_id: VendorId,
    /// Product display name.
    pub name: String,
    /// Current base price before option adjustments.
    pub base_price: Decimal,
    /// Whether the product can currently be added to carts.
    pub available: bool,
}
