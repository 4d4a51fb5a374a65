//! Persistence seams for the workflow.
//!
//! Storage mechanics are an external concern: collaborators expose
//! CRUD-style operations behind async traits and the workflow calls them
//! through `Arc<dyn _>` handles. The [`memory`] module provides the
//! in-process adapter used by tests and local runs; a database-backed
//! deployment implements the same traits.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use mekong_core::{
    AddressId, CartId, CartLineId, CustomerId, FulfillmentStatus, FulfillmentUnitId, OrderId,
    OrderStatus, ProductId, VendorId,
};

use crate::models::{
    Address, Cart, CartLine, Customer, FulfillmentUnit, NewAddress, NewCartLine, NewOrder, Order,
    Product, Vendor,
};

pub mod memory;

pub use memory::MemoryStore;

/// Error raised by a store implementation.
///
/// Lookups signal absence with `Ok(None)`; `NotFound` is reserved for
/// mutations that target a row which no longer exists.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row targeted by a mutation does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Read access to customer accounts.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Get a customer by ID.
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
}

/// Read access to the product and vendor catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Get a product by ID.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Get a vendor by ID.
    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError>;
}

/// Cart persistence.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch the customer's cart, creating an empty one on first access.
    async fn get_or_create(&self, customer_id: CustomerId) -> Result<Cart, StoreError>;

    /// Find a cart line together with its owning cart.
    async fn get_line(&self, line_id: CartLineId)
    -> Result<Option<(Cart, CartLine)>, StoreError>;

    /// Append a line to a cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the cart does not exist.
    async fn add_line(&self, cart_id: CartId, line: NewCartLine) -> Result<CartLine, StoreError>;

    /// Change a line's quantity.
    async fn update_line_quantity(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, StoreError>;

    /// Remove a single line.
    async fn remove_line(&self, line_id: CartLineId) -> Result<(), StoreError>;

    /// Drain all lines from a cart. The cart itself survives.
    async fn clear(&self, cart_id: CartId) -> Result<(), StoreError>;
}

/// Address persistence.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Get an address by ID.
    async fn get_address(&self, id: AddressId) -> Result<Option<Address>, StoreError>;

    /// List a customer's addresses, default first.
    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Address>, StoreError>;

    /// Create an address.
    async fn create_address(&self, address: NewAddress) -> Result<Address, StoreError>;

    /// Replace an address's stored fields.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the address does not exist.
    async fn update_address(&self, address: Address) -> Result<Address, StoreError>;

    /// Delete an address.
    async fn delete_address(&self, id: AddressId) -> Result<(), StoreError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a fully assembled order with its units and items as one
    /// atomic write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the order number is already taken.
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Get an order (with all units) by ID.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// List a customer's orders, newest first.
    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError>;

    /// List every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    /// List a vendor's fulfillment units, newest first, each paired with
    /// its parent order.
    async fn list_units_by_vendor(
        &self,
        vendor_id: VendorId,
    ) -> Result<Vec<(Order, FulfillmentUnit)>, StoreError>;

    /// Find a fulfillment unit together with its parent order.
    async fn find_unit(
        &self,
        unit_id: FulfillmentUnitId,
    ) -> Result<Option<(Order, FulfillmentUnit)>, StoreError>;

    /// Set a unit's status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the unit does not exist.
    async fn update_unit_status(
        &self,
        unit_id: FulfillmentUnitId,
        status: FulfillmentStatus,
    ) -> Result<FulfillmentUnit, StoreError>;

    /// Set an order's derived aggregate status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the order does not exist.
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError>;
}

/// Named atomic sequences.
///
/// Order numbering draws from a dedicated monotonic counter instead of a
/// live row count, so two concurrent checkouts can never mint the same
/// number.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increment and return the named sequence. First call
    /// returns 1.
    async fn next(&self, name: &str) -> Result<u64, StoreError>;
}

/// Bundle of every store handle the workflow needs.
///
/// Cheaply cloneable; each field may point at a different backend or, as
/// with [`Stores::in_memory`], at one shared implementation.
#[derive(Clone)]
pub struct Stores {
    /// Customer accounts.
    pub customers: Arc<dyn CustomerStore>,
    /// Products and vendors.
    pub catalog: Arc<dyn CatalogStore>,
    /// Carts.
    pub carts: Arc<dyn CartStore>,
    /// Delivery addresses.
    pub addresses: Arc<dyn AddressStore>,
    /// Orders, units, and items.
    pub orders: Arc<dyn OrderStore>,
    /// Atomic counters.
    pub sequences: Arc<dyn SequenceStore>,
}

impl Stores {
    /// Wire every handle to one shared implementation.
    #[must_use]
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: CustomerStore
            + CatalogStore
            + CartStore
            + AddressStore
            + OrderStore
            + SequenceStore
            + 'static,
    {
        Self {
            customers: store.clone(),
            catalog: store.clone(),
            carts: store.clone(),
            addresses: store.clone(),
            orders: store.clone(),
            sequences: store,
        }
    }

    /// Wire every handle to a fresh shared [`MemoryStore`].
    ///
    /// Also returns the concrete store so tests can seed it.
    #[must_use]
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Self::from_shared(store.clone()), store)
    }
}
