//! Domain types for the marketplace workflow.
//!
//! These types represent validated domain objects, separate from whatever
//! row types a concrete store backend uses.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;

pub use address::{Address, NewAddress};
pub use cart::{Cart, CartLine, NewCartLine};
pub use catalog::{Customer, Product, Vendor};
pub use order::{
    DeliveryDetails, FulfillmentUnit, LineItem, NewFulfillmentUnit, NewLineItem, NewOrder, Order,
};

use mekong_core::{CustomerId, VendorId};

/// The authenticated principal invoking an order operation.
///
/// Authentication itself happens outside this crate; callers hand the
/// workflow an already-resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// A customer acting on their own carts, addresses, and orders.
    Customer(CustomerId),
    /// A vendor acting on the fulfillment units assigned to them.
    Vendor(VendorId),
    /// Back-office staff with unrestricted read access.
    Admin,
}
