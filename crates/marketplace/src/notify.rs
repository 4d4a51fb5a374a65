//! Real-time notification dispatch.
//!
//! Events are published fire-and-forget to per-recipient logical channels:
//! `topic/vendor/{vendorId}/orders` for new fulfillment units and
//! `topic/customer/{customerId}/order-updates` for status changes. Delivery
//! is at-most-once: a recipient who is not currently listening simply
//! misses the event. A failed publish for one recipient is logged and never
//! aborts the surrounding workflow or the remaining sends.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::sync::broadcast;

use mekong_core::{CustomerId, FulfillmentStatus, VendorId};

use crate::models::{FulfillmentUnit, Order};

/// Default localized message on a new-order notification.
pub const NEW_ORDER_MESSAGE: &str = "Bạn có đơn hàng mới!";

/// Channel a vendor listens on for new fulfillment units.
///
/// The name format is load-bearing: existing consumers subscribe to it.
#[must_use]
pub fn vendor_topic(vendor_id: VendorId) -> String {
    format!("topic/vendor/{vendor_id}/orders")
}

/// Channel a customer listens on for status updates.
#[must_use]
pub fn customer_topic(customer_id: CustomerId) -> String {
    format!("topic/customer/{customer_id}/order-updates")
}

/// Localized customer-facing message for a unit status.
#[must_use]
pub const fn status_message(status: FulfillmentStatus) -> &'static str {
    match status {
        FulfillmentStatus::Pending => "Đơn hàng đang chờ xác nhận",
        FulfillmentStatus::Cooking => "Bếp đang nấu! Đơn hàng sẽ được giao trong giây lát",
        FulfillmentStatus::Ready => "Món ăn đã sẵn sàng",
        FulfillmentStatus::PickedUp => "Đơn hàng đang được giao đến bạn",
        FulfillmentStatus::Delivered => "Đơn hàng đã được giao thành công",
        FulfillmentStatus::Cancelled => "Đơn hàng đã bị hủy",
    }
}

/// Payload announcing a new fulfillment unit to its vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUnitNotification {
    /// Aggregate order number.
    pub order_number: String,
    /// This vendor's unit number.
    pub unit_number: String,
    /// Unit subtotal.
    pub subtotal: Decimal,
    /// Number of line items in the unit.
    pub item_count: usize,
    /// Customer display name.
    pub customer_name: String,
    /// Formatted delivery address.
    pub delivery_address: String,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// Localized headline.
    pub message: String,
}

/// Payload announcing a unit status change to the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeNotification {
    /// Aggregate order number.
    pub order_number: String,
    /// Unit whose status changed.
    pub unit_number: String,
    /// Store name of the vendor fulfilling the unit.
    pub vendor_name: String,
    /// Status before the change.
    pub old_status: FulfillmentStatus,
    /// Status after the change.
    pub new_status: FulfillmentStatus,
    /// Localized message for the new status.
    pub message: String,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
}

/// Error raised by a notifier implementation.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The payload could not be encoded.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport rejected the publish.
    #[error("publish to {topic} failed: {reason}")]
    Publish {
        /// Topic the publish targeted.
        topic: String,
        /// Transport-specific failure description.
        reason: String,
    },
}

/// Fire-and-forget publisher to a logical topic.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a payload to a topic. No acknowledgment, no persistence.
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), NotifyError>;
}

/// In-process broker backed by per-topic broadcast channels.
///
/// Subscribing creates the topic; publishing to a topic nobody has ever
/// subscribed to is a silent no-op, and a send with no live receivers is
/// the documented missed-event case, not an error.
pub struct BroadcastNotifier {
    channels: RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>,
    capacity: usize,
}

impl BroadcastNotifier {
    /// Create a broker whose topics buffer `capacity` in-flight events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribe to a topic, creating it if needed.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), NotifyError> {
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(topic) {
            // A send error means no receiver is currently listening; the
            // event is simply missed (at-most-once).
            let _ = sender.send(payload);
        }
        Ok(())
    }
}

/// Dispatch service wrapping a [`Notifier`].
///
/// Owns payload assembly and the swallow-and-log guard around every send.
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    /// Create a dispatch service over a notifier.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Announce a freshly created fulfillment unit to its vendor.
    ///
    /// Failures are logged and swallowed: one unreachable vendor must not
    /// abort order creation or the remaining vendor sends.
    pub async fn notify_vendor_new_unit(&self, order: &Order, unit: &FulfillmentUnit) {
        let notification = NewUnitNotification {
            order_number: order.order_number.clone(),
            unit_number: unit.unit_number.clone(),
            subtotal: unit.subtotal,
            item_count: unit.items.len(),
            customer_name: order.customer_name.clone(),
            delivery_address: order.delivery.address.clone(),
            timestamp: Utc::now(),
            message: NEW_ORDER_MESSAGE.to_string(),
        };

        let topic = vendor_topic(unit.vendor_id);
        match self.try_publish(&topic, &notification).await {
            Ok(()) => {
                tracing::info!(
                    vendor_id = %unit.vendor_id,
                    unit_number = %unit.unit_number,
                    topic,
                    "sent new order notification"
                );
            }
            Err(error) => {
                tracing::error!(
                    %error,
                    vendor_id = %unit.vendor_id,
                    unit_number = %unit.unit_number,
                    "failed to notify vendor of new unit"
                );
            }
        }
    }

    /// Announce a unit status change to the order's customer.
    ///
    /// Failures are logged and swallowed; the status change itself has
    /// already been persisted and stands.
    pub async fn notify_customer_status_change(
        &self,
        order: &Order,
        unit: &FulfillmentUnit,
        old_status: FulfillmentStatus,
    ) {
        let notification = StatusChangeNotification {
            order_number: order.order_number.clone(),
            unit_number: unit.unit_number.clone(),
            vendor_name: unit.vendor_name.clone(),
            old_status,
            new_status: unit.status,
            message: status_message(unit.status).to_string(),
            timestamp: Utc::now(),
        };

        let topic = customer_topic(order.customer_id);
        match self.try_publish(&topic, &notification).await {
            Ok(()) => {
                tracing::info!(
                    customer_id = %order.customer_id,
                    unit_number = %unit.unit_number,
                    old_status = %old_status,
                    new_status = %unit.status,
                    topic,
                    "sent status update notification"
                );
            }
            Err(error) => {
                tracing::error!(
                    %error,
                    customer_id = %order.customer_id,
                    unit_number = %unit.unit_number,
                    "failed to notify customer of status change"
                );
            }
        }
    }

    async fn try_publish<T: Serialize>(&self, topic: &str, payload: &T) -> Result<(), NotifyError> {
        let value = serde_json::to_value(payload)?;
        self.notifier.publish(topic, value).await
    }
}
