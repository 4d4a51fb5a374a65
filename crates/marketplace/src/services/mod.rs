//! Business logic services for the marketplace workflow.
//!
//! # Services
//!
//! - `addresses` - Delivery address book with the single-default invariant
//! - `carts` - Cart building and maintenance
//! - `orders` - Checkout splitting, the fulfillment status lifecycle, and
//!   role-scoped order visibility

pub mod addresses;
pub mod carts;
pub mod orders;

pub use addresses::{AddressRequest, AddressService};
pub use carts::{CartLineView, CartService, CartView, VendorGroupView};
pub use orders::{CreateOrderRequest, DailyRevenue, OrderService, VendorStats};
