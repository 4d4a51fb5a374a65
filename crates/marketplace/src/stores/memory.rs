//! In-memory store adapter.
//!
//! Backs tests and local runs. A single [`MemoryStore`] implements every
//! store trait over one `RwLock`-guarded map set, so each trait call is
//! atomic the same way a database transaction would be.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use mekong_core::{
    AddressId, CartId, CartLineId, CustomerId, FulfillmentStatus, FulfillmentUnitId, LineItemId,
    OrderId, OrderStatus, ProductId, VendorId,
};
use rust_decimal::Decimal;

use crate::models::{
    Address, Cart, CartLine, Customer, FulfillmentUnit, LineItem, NewAddress, NewCartLine,
    NewOrder, Order, Product, Vendor,
};

use super::{
    AddressStore, CartStore, CatalogStore, CustomerStore, OrderStore, SequenceStore, StoreError,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    customers: HashMap<CustomerId, Customer>,
    vendors: HashMap<VendorId, Vendor>,
    products: HashMap<ProductId, Product>,
    cart_ids_by_customer: HashMap<CustomerId, CartId>,
    carts: HashMap<CartId, Cart>,
    addresses: HashMap<AddressId, Address>,
    orders: HashMap<OrderId, Order>,
    sequences: HashMap<String, u64>,
}

impl Inner {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a customer account.
    pub async fn seed_customer(&self, full_name: &str) -> Customer {
        let mut inner = self.inner.write().await;
        let customer = Customer {
            id: CustomerId::new(inner.alloc_id()),
            full_name: full_name.to_string(),
        };
        inner.customers.insert(customer.id, customer.clone());
        customer
    }

    /// Seed a vendor storefront.
    pub async fn seed_vendor(&self, store_name: &str) -> Vendor {
        let mut inner = self.inner.write().await;
        let vendor = Vendor {
            id: VendorId::new(inner.alloc_id()),
            store_name: store_name.to_string(),
        };
        inner.vendors.insert(vendor.id, vendor.clone());
        vendor
    }

    /// Seed a catalog product.
    pub async fn seed_product(
        &self,
        vendor_id: VendorId,
        name: &str,
        base_price: Decimal,
        available: bool,
    ) -> Product {
        let mut inner = self.inner.write().await;
        let product = Product {
            id: ProductId::new(inner.alloc_id()),
            vendor_id,
            name: name.to_string(),
            base_price,
            available,
        };
        inner.products.insert(product.id, product.clone());
        product
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.inner.read().await.customers.get(&id).cloned())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError> {
        Ok(self.inner.read().await.vendors.get(&id).cloned())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_or_create(&self, customer_id: CustomerId) -> Result<Cart, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(cart_id) = inner.cart_ids_by_customer.get(&customer_id).copied()
            && let Some(cart) = inner.carts.get(&cart_id)
        {
            return Ok(cart.clone());
        }

        let now = Utc::now();
        let cart = Cart {
            id: CartId::new(inner.alloc_id()),
            customer_id,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.cart_ids_by_customer.insert(customer_id, cart.id);
        inner.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn get_line(
        &self,
        line_id: CartLineId,
    ) -> Result<Option<(Cart, CartLine)>, StoreError> {
        let inner = self.inner.read().await;
        for cart in inner.carts.values() {
            if let Some(line) = cart.lines.iter().find(|line| line.id == line_id) {
                return Ok(Some((cart.clone(), line.clone())));
            }
        }
        Ok(None)
    }

    async fn add_line(&self, cart_id: CartId, line: NewCartLine) -> Result<CartLine, StoreError> {
        let mut inner = self.inner.write().await;
        let id = CartLineId::new(inner.alloc_id());
        let cart = inner.carts.get_mut(&cart_id).ok_or(StoreError::NotFound)?;
        let now = Utc::now();
        let line = CartLine {
            id,
            product_id: line.product_id,
            quantity: line.quantity,
            selected_options_json: line.selected_options_json,
            added_at: now,
        };
        cart.lines.push(line.clone());
        cart.updated_at = now;
        Ok(line)
    }

    async fn update_line_quantity(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, StoreError> {
        let mut inner = self.inner.write().await;
        for cart in inner.carts.values_mut() {
            if let Some(line) = cart.lines.iter_mut().find(|line| line.id == line_id) {
                line.quantity = quantity;
                let updated = line.clone();
                cart.updated_at = Utc::now();
                return Ok(updated);
            }
        }
        Err(StoreError::NotFound)
    }

    async fn remove_line(&self, line_id: CartLineId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for cart in inner.carts.values_mut() {
            let before = cart.lines.len();
            cart.lines.retain(|line| line.id != line_id);
            if cart.lines.len() != before {
                cart.updated_at = Utc::now();
                return Ok(());
            }
        }
        Err(StoreError::NotFound)
    }

    async fn clear(&self, cart_id: CartId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let cart = inner.carts.get_mut(&cart_id).ok_or(StoreError::NotFound)?;
        cart.lines.clear();
        cart.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn get_address(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        Ok(self.inner.read().await.addresses.get(&id).cloned())
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Address>, StoreError> {
        let inner = self.inner.read().await;
        let mut addresses: Vec<Address> = inner
            .addresses
            .values()
            .filter(|address| address.customer_id == customer_id)
            .cloned()
            .collect();
        addresses.sort_by_key(|address| (Reverse(address.is_default), address.id));
        Ok(addresses)
    }

    async fn create_address(&self, address: NewAddress) -> Result<Address, StoreError> {
        let mut inner = self.inner.write().await;
        let address = Address {
            id: AddressId::new(inner.alloc_id()),
            customer_id: address.customer_id,
            recipient_name: address.recipient_name,
            recipient_phone: address.recipient_phone,
            line: address.line,
            ward: address.ward,
            district: address.district,
            city: address.city,
            label: address.label,
            is_default: address.is_default,
            created_at: Utc::now(),
        };
        inner.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn update_address(&self, address: Address) -> Result<Address, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.addresses.contains_key(&address.id) {
            return Err(StoreError::NotFound);
        }
        inner.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .addresses
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .orders
            .values()
            .any(|existing| existing.order_number == order.order_number)
        {
            return Err(StoreError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }

        let now = Utc::now();
        let order_id = OrderId::new(inner.alloc_id());
        let mut units = Vec::with_capacity(order.units.len());
        for unit in order.units {
            let unit_id = FulfillmentUnitId::new(inner.alloc_id());
            let mut items = Vec::with_capacity(unit.items.len());
            for item in unit.items {
                items.push(LineItem {
                    id: LineItemId::new(inner.alloc_id()),
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price: item.price,
                    selected_options_json: item.selected_options_json,
                });
            }
            units.push(FulfillmentUnit {
                id: unit_id,
                order_id,
                vendor_id: unit.vendor_id,
                vendor_name: unit.vendor_name,
                unit_number: unit.unit_number,
                subtotal: unit.subtotal,
                status: FulfillmentStatus::Pending,
                items,
                created_at: now,
                updated_at: now,
            });
        }

        let order = Order {
            id: order_id,
            order_number: order.order_number,
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            shipping_fee: order.shipping_fee,
            payment_method: order.payment_method,
            delivery: order.delivery,
            notes: order.notes,
            units,
            created_at: now,
            updated_at: now,
        };
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| Reverse((order.created_at, order.id)));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by_key(|order| Reverse((order.created_at, order.id)));
        Ok(orders)
    }

    async fn list_units_by_vendor(
        &self,
        vendor_id: VendorId,
    ) -> Result<Vec<(Order, FulfillmentUnit)>, StoreError> {
        let inner = self.inner.read().await;
        let mut pairs: Vec<(Order, FulfillmentUnit)> = Vec::new();
        for order in inner.orders.values() {
            for unit in &order.units {
                if unit.vendor_id == vendor_id {
                    pairs.push((order.clone(), unit.clone()));
                }
            }
        }
        pairs.sort_by_key(|(_, unit)| Reverse((unit.created_at, unit.id)));
        Ok(pairs)
    }

    async fn find_unit(
        &self,
        unit_id: FulfillmentUnitId,
    ) -> Result<Option<(Order, FulfillmentUnit)>, StoreError> {
        let inner = self.inner.read().await;
        for order in inner.orders.values() {
            if let Some(unit) = order.units.iter().find(|unit| unit.id == unit_id) {
                return Ok(Some((order.clone(), unit.clone())));
            }
        }
        Ok(None)
    }

    async fn update_unit_status(
        &self,
        unit_id: FulfillmentUnitId,
        status: FulfillmentStatus,
    ) -> Result<FulfillmentUnit, StoreError> {
        let mut inner = self.inner.write().await;
        for order in inner.orders.values_mut() {
            if let Some(unit) = order.units.iter_mut().find(|unit| unit.id == unit_id) {
                let now = Utc::now();
                unit.status = status;
                unit.updated_at = now;
                let updated = unit.clone();
                order.updated_at = now;
                return Ok(updated);
            }
        }
        Err(StoreError::NotFound)
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let order = inner.orders.get_mut(&order_id).ok_or(StoreError::NotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for MemoryStore {
    async fn next(&self, name: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let counter = inner.sequences.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
