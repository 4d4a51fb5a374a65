//! Order workflow: checkout splitting, the fulfillment status lifecycle,
//! and role-scoped order visibility.
//!
//! Checkout partitions a multi-vendor cart into one fulfillment unit per
//! vendor, snapshots prices and options into immutable line items, and only
//! drains the cart once everything is durable. Vendor notifications go out
//! afterwards, individually guarded so one unreachable vendor cannot spoil
//! the order or the remaining sends.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use mekong_core::{
    AddressId, CustomerId, FulfillmentStatus, FulfillmentUnitId, OrderId, OrderStatus, VendorId,
};

use crate::error::{MarketplaceError, Result};
use crate::models::{
    Caller, CartLine, DeliveryDetails, FulfillmentUnit, NewFulfillmentUnit, NewLineItem, NewOrder,
    Order, Product,
};
use crate::notify::NotificationService;
use crate::pricing::{self, ShippingPolicy};
use crate::stores::Stores;

/// Name of the atomic sequence backing order numbers.
const ORDER_SEQUENCE: &str = "order_number";

/// Days of history in the vendor revenue chart.
const REVENUE_CHART_DAYS: u64 = 7;

/// Input for [`OrderService::create_order`].
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    /// Delivery address; must belong to the ordering customer.
    pub address_id: AddressId,
    /// Payment-method tag recorded on the order.
    pub payment_method: String,
    /// Free-form customer notes.
    pub notes: Option<String>,
}

/// Dashboard statistics for one vendor.
#[derive(Debug, Clone)]
pub struct VendorStats {
    /// Revenue from completed units.
    pub total_revenue: Decimal,
    /// All units ever assigned to the vendor.
    pub total_units: u64,
    /// Units still awaiting the vendor on live orders.
    pub pending_units: u64,
    /// Units somewhere between accepted and delivered.
    pub processing_units: u64,
    /// Delivered units (or units on completed orders).
    pub completed_units: u64,
    /// Cancelled units (or units on cancelled orders).
    pub cancelled_units: u64,
    /// Daily revenue over the last week, oldest day first.
    pub revenue_chart: Vec<DailyRevenue>,
}

/// One day of a vendor's revenue history.
#[derive(Debug, Clone)]
pub struct DailyRevenue {
    /// Calendar day.
    pub date: NaiveDate,
    /// Revenue from units delivered that day.
    pub revenue: Decimal,
    /// Number of units delivered that day.
    pub order_count: u64,
}

/// A cart line resolved against the catalog and priced for checkout.
struct PricedLine {
    line: CartLine,
    product: Product,
    unit_price: Decimal,
    subtotal: Decimal,
}

/// All of one vendor's priced lines, in cart order.
struct VendorGroup {
    vendor_id: VendorId,
    lines: Vec<PricedLine>,
}

/// Order operations: the two externally visible workflow entry points plus
/// role-scoped reads.
#[derive(Clone)]
pub struct OrderService {
    stores: Stores,
    shipping: ShippingPolicy,
    notifications: NotificationService,
}

impl OrderService {
    /// Create an order service over its collaborators.
    #[must_use]
    pub fn new(
        stores: Stores,
        shipping: ShippingPolicy,
        notifications: NotificationService,
    ) -> Self {
        Self {
            stores,
            shipping,
            notifications,
        }
    }

    /// Convert the customer's cart into one aggregate order plus one
    /// fulfillment unit per vendor.
    ///
    /// The cart is drained only after the order and all its units are
    /// durable; vendor notifications follow and are never allowed to fail
    /// the operation.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` for a cart with no lines, `NotFound` for an
    /// unknown customer/address/product/vendor, and `Permission` if the
    /// address belongs to another customer. All of these reject before any
    /// mutation.
    #[instrument(skip(self, request), fields(address_id = %request.address_id))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        request: CreateOrderRequest,
    ) -> Result<Order> {
        let customer = self
            .stores
            .customers
            .get_customer(customer_id)
            .await?
            .ok_or(MarketplaceError::NotFound("customer"))?;

        let cart = self.stores.carts.get_or_create(customer_id).await?;
        if cart.lines.is_empty() {
            return Err(MarketplaceError::EmptyCart);
        }

        let address = self
            .stores
            .addresses
            .get_address(request.address_id)
            .await?
            .ok_or(MarketplaceError::NotFound("address"))?;
        if address.customer_id != customer_id {
            return Err(MarketplaceError::Permission(
                "address does not belong to current customer",
            ));
        }

        let delivery = DeliveryDetails {
            recipient_name: address.recipient_name.clone(),
            recipient_phone: address.recipient_phone.clone(),
            address: address.formatted(),
        };

        let groups = self.group_lines_by_vendor(&cart.lines).await?;
        tracing::info!(vendor_count = groups.len(), "splitting cart into fulfillment units");

        let total_amount: Decimal = groups
            .iter()
            .flat_map(|group| &group.lines)
            .map(|priced| priced.subtotal)
            .sum();
        let shipping_fee = self.shipping.fee(&address.city, total_amount);
        let order_number = self.next_order_number().await?;

        let mut units = Vec::with_capacity(groups.len());
        for (index, group) in groups.into_iter().enumerate() {
            let vendor = self
                .stores
                .catalog
                .get_vendor(group.vendor_id)
                .await?
                .ok_or(MarketplaceError::NotFound("vendor"))?;

            let subtotal: Decimal = group.lines.iter().map(|priced| priced.subtotal).sum();
            let unit_number = format!("{order_number}-{}", unit_suffix(index));
            let items = group
                .lines
                .into_iter()
                .map(|priced| NewLineItem {
                    product_id: priced.product.id,
                    product_name: priced.product.name,
                    quantity: priced.line.quantity,
                    price: priced.unit_price,
                    // Verbatim copy: the order keeps the cart's snapshot,
                    // not a live reference.
                    selected_options_json: priced.line.selected_options_json,
                })
                .collect();

            units.push(NewFulfillmentUnit {
                vendor_id: vendor.id,
                vendor_name: vendor.store_name,
                unit_number,
                subtotal,
                items,
            });
        }

        let order = self
            .stores
            .orders
            .create_order(NewOrder {
                order_number,
                customer_id,
                customer_name: customer.full_name,
                total_amount,
                shipping_fee,
                payment_method: request.payment_method,
                delivery,
                notes: request.notes,
                units,
            })
            .await?;

        tracing::info!(
            order_number = %order.order_number,
            unit_count = order.units.len(),
            total = %order.total_amount,
            "created order"
        );

        // Drain the cart only after the order and all its units are durable.
        self.stores.carts.clear(cart.id).await?;
        tracing::info!(cart_id = %cart.id, "cleared cart after checkout");

        // Vendor fanout in unit order; each send individually guarded.
        for unit in &order.units {
            self.notifications.notify_vendor_new_unit(&order, unit).await;
        }

        Ok(order)
    }

    /// List orders visible to the caller.
    ///
    /// Customers see their own orders; vendors see only their fulfillment
    /// units, grouped under their aggregate orders; admins see everything.
    /// All listings are newest first.
    ///
    /// # Errors
    ///
    /// Returns `Store` on collaborator failure.
    pub async fn list_orders(&self, caller: Caller) -> Result<Vec<Order>> {
        match caller {
            Caller::Customer(customer_id) => {
                Ok(self.stores.orders.list_by_customer(customer_id).await?)
            }
            Caller::Vendor(vendor_id) => {
                let pairs = self.stores.orders.list_units_by_vendor(vendor_id).await?;
                Ok(group_units_by_order(pairs))
            }
            Caller::Admin => Ok(self.stores.orders.list_all().await?),
        }
    }

    /// Fetch a single order with the caller's visibility applied.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown order and `Permission` when the
    /// caller has no stake in it.
    pub async fn get_order(&self, order_id: OrderId, caller: Caller) -> Result<Order> {
        let order = self
            .stores
            .orders
            .get_order(order_id)
            .await?
            .ok_or(MarketplaceError::NotFound("order"))?;

        match caller {
            Caller::Admin => Ok(order),
            Caller::Customer(customer_id) => {
                if order.customer_id != customer_id {
                    tracing::warn!(%customer_id, %order_id, "customer attempted to view foreign order");
                    return Err(MarketplaceError::Permission(
                        "order does not belong to current customer",
                    ));
                }
                Ok(order)
            }
            Caller::Vendor(vendor_id) => {
                let mut order = order;
                order.units.retain(|unit| unit.vendor_id == vendor_id);
                if order.units.is_empty() {
                    tracing::warn!(%vendor_id, %order_id, "vendor attempted to view order without own units");
                    return Err(MarketplaceError::Permission(
                        "no fulfillment units in this order belong to current vendor",
                    ));
                }
                Ok(order)
            }
        }
    }

    /// Move a fulfillment unit to a new status and re-derive the aggregate
    /// order status.
    ///
    /// The customer is notified afterwards; that send is guarded and never
    /// rolls back the persisted change.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown unit, `Permission` if the caller
    /// is not the unit's vendor, and `InvalidTransition` for an illegal
    /// edge. All of these leave the unit untouched.
    #[instrument(skip(self))]
    pub async fn update_unit_status(
        &self,
        unit_id: FulfillmentUnitId,
        caller_vendor_id: VendorId,
        new_status: FulfillmentStatus,
    ) -> Result<FulfillmentUnit> {
        let (order, unit) = self
            .stores
            .orders
            .find_unit(unit_id)
            .await?
            .ok_or(MarketplaceError::NotFound("fulfillment unit"))?;

        if unit.vendor_id != caller_vendor_id {
            tracing::warn!(
                %caller_vendor_id,
                unit_vendor_id = %unit.vendor_id,
                unit_number = %unit.unit_number,
                "vendor attempted to update foreign unit"
            );
            return Err(MarketplaceError::Permission(
                "fulfillment unit does not belong to current vendor",
            ));
        }

        let old_status = unit.status;
        if !old_status.can_transition_to(new_status) {
            return Err(MarketplaceError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        let updated_unit = self
            .stores
            .orders
            .update_unit_status(unit_id, new_status)
            .await?;
        tracing::info!(
            unit_number = %updated_unit.unit_number,
            %old_status,
            %new_status,
            "updated fulfillment unit status"
        );

        // Fold the derivation over the sibling statuses already in hand
        // instead of re-reading the order.
        let statuses = order.units.iter().map(|sibling| {
            if sibling.id == unit_id {
                new_status
            } else {
                sibling.status
            }
        });
        let order_status = OrderStatus::derive(statuses);
        self.stores
            .orders
            .update_order_status(order.id, order_status)
            .await?;
        tracing::info!(
            order_number = %order.order_number,
            %order_status,
            "derived aggregate order status"
        );

        self.notifications
            .notify_customer_status_change(&order, &updated_unit, old_status)
            .await;

        Ok(updated_unit)
    }

    /// Dashboard statistics for a vendor.
    ///
    /// # Errors
    ///
    /// Returns `Store` on collaborator failure.
    pub async fn vendor_stats(&self, vendor_id: VendorId) -> Result<VendorStats> {
        let pairs = self.stores.orders.list_units_by_vendor(vendor_id).await?;

        let today = Utc::now().date_naive();
        let mut daily: BTreeMap<NaiveDate, DailyRevenue> = (0..REVENUE_CHART_DAYS)
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| {
                (
                    date,
                    DailyRevenue {
                        date,
                        revenue: Decimal::ZERO,
                        order_count: 0,
                    },
                )
            })
            .collect();

        let mut total_revenue = Decimal::ZERO;
        let total_units = pairs.len() as u64;
        let mut pending_units = 0_u64;
        let mut completed_units = 0_u64;
        let mut cancelled_units = 0_u64;

        for (order, unit) in &pairs {
            let completed = unit.status == FulfillmentStatus::Delivered
                || order.status == OrderStatus::Completed;
            if completed {
                total_revenue += unit.subtotal;
                completed_units += 1;
            }
            if unit.status == FulfillmentStatus::Pending
                && order.status != OrderStatus::Completed
                && order.status != OrderStatus::Cancelled
            {
                pending_units += 1;
            }
            if unit.status == FulfillmentStatus::Cancelled
                || order.status == OrderStatus::Cancelled
            {
                cancelled_units += 1;
            }
            if unit.status == FulfillmentStatus::Delivered
                && let Some(day) = daily.get_mut(&unit.updated_at.date_naive())
            {
                day.revenue += unit.subtotal;
                day.order_count += 1;
            }
        }

        let processing_units =
            total_units.saturating_sub(pending_units + completed_units + cancelled_units);

        Ok(VendorStats {
            total_revenue,
            total_units,
            pending_units,
            processing_units,
            completed_units,
            cancelled_units,
            revenue_chart: daily.into_values().collect(),
        })
    }

    /// Resolve each cart line against the catalog, price it, and group by
    /// vendor preserving vendor-first-seen order.
    async fn group_lines_by_vendor(&self, lines: &[CartLine]) -> Result<Vec<VendorGroup>> {
        let mut groups: Vec<VendorGroup> = Vec::new();
        let mut index_by_vendor: HashMap<VendorId, usize> = HashMap::new();

        for line in lines {
            let product = self
                .stores
                .catalog
                .get_product(line.product_id)
                .await?
                .ok_or(MarketplaceError::NotFound("product"))?;

            let options = line.selected_options();
            let unit_price = pricing::line_unit_price(product.base_price, &options);
            let subtotal = pricing::line_subtotal(unit_price, line.quantity);
            let vendor_id = product.vendor_id;
            let priced = PricedLine {
                line: line.clone(),
                product,
                unit_price,
                subtotal,
            };

            if let Some(&index) = index_by_vendor.get(&vendor_id) {
                if let Some(group) = groups.get_mut(index) {
                    group.lines.push(priced);
                }
            } else {
                index_by_vendor.insert(vendor_id, groups.len());
                groups.push(VendorGroup {
                    vendor_id,
                    lines: vec![priced],
                });
            }
        }

        Ok(groups)
    }

    /// Mint the next order number: `ORD` + date + zero-padded sequence.
    async fn next_order_number(&self) -> Result<String> {
        let sequence = self.stores.sequences.next(ORDER_SEQUENCE).await?;
        Ok(format!(
            "ORD{}{sequence:05}",
            Utc::now().format("%Y%m%d")
        ))
    }
}

/// Bijective base-26 unit suffix: `A`..`Z`, then `AA`, `AB`, ...
///
/// Unbounded, so an order with more than 26 vendors still numbers cleanly.
fn unit_suffix(index: usize) -> String {
    let mut n = index + 1;
    let mut suffix = String::new();
    while n > 0 {
        n -= 1;
        #[allow(clippy::cast_possible_truncation)] // remainder is < 26
        let letter = char::from(b'A' + (n % 26) as u8);
        suffix.insert(0, letter);
        n /= 26;
    }
    suffix
}

/// Group vendor unit/order pairs into orders carrying only that vendor's
/// units, preserving the recency order of the pairs.
fn group_units_by_order(pairs: Vec<(Order, FulfillmentUnit)>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();
    let mut index_by_order: HashMap<OrderId, usize> = HashMap::new();

    for (order, unit) in pairs {
        if let Some(&index) = index_by_order.get(&order.id) {
            if let Some(existing) = orders.get_mut(index) {
                existing.units.push(unit);
            }
        } else {
            index_by_order.insert(order.id, orders.len());
            let mut filtered = order;
            filtered.units = vec![unit];
            orders.push(filtered);
        }
    }

    orders
}
