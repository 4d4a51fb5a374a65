//! Test fixtures for driving the marketplace workflow end to end.
//!
//! [`TestMarket`] wires an [`AppState`] to a shared in-memory store and an
//! in-process broadcast broker, plus seeding shortcuts for the entities the
//! scenarios need. [`RecordingNotifier`] swaps in for the broker when a test
//! needs to observe publish order or inject per-topic failures.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use mekong_core::{AddressId, CustomerId, ProductId, SelectedOption, VendorId};
use mekong_marketplace::AppState;
use mekong_marketplace::config::MarketplaceConfig;
use mekong_marketplace::models::Order;
use mekong_marketplace::notify::{BroadcastNotifier, Notifier, NotifyError};
use mekong_marketplace::services::{AddressRequest, CreateOrderRequest};
use mekong_marketplace::stores::{MemoryStore, Stores};

/// A fully wired in-memory marketplace.
pub struct TestMarket {
    /// Application state handing out services.
    pub state: AppState,
    /// Concrete store for seeding.
    pub store: Arc<MemoryStore>,
    /// Concrete broker for subscribing to topics.
    pub broker: Arc<BroadcastNotifier>,
}

impl TestMarket {
    /// Build a marketplace with default configuration.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let (state, store, broker) = AppState::in_memory(MarketplaceConfig::default());
        Self {
            state,
            store,
            broker,
        }
    }

    /// Build a marketplace with a custom notifier instead of the broker.
    ///
    /// The returned broker is still constructed but unused.
    #[must_use]
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> (Self, Arc<MemoryStore>) {
        init_tracing();
        let (stores, store) = Stores::in_memory();
        let state = AppState::new(MarketplaceConfig::default(), stores, notifier);
        let broker = Arc::new(BroadcastNotifier::new(8));
        (
            Self {
                state,
                store: store.clone(),
                broker,
            },
            store,
        )
    }

    /// Seed a customer with one default address in the given city.
    pub async fn seed_customer_with_address(
        &self,
        full_name: &str,
        city: &str,
    ) -> (CustomerId, AddressId) {
        let customer = self.store.seed_customer(full_name).await;
        let address = self
            .state
            .address_service()
            .create(
                customer.id,
                AddressRequest {
                    recipient_name: full_name.to_string(),
                    recipient_phone: "0901234567".to_string(),
                    line: "12 Lý Thường Kiệt".to_string(),
                    ward: "Phường Trần Hưng Đạo".to_string(),
                    district: "Hoàn Kiếm".to_string(),
                    city: city.to_string(),
                    label: None,
                    is_default: true,
                },
            )
            .await
            .expect("seed address");
        (customer.id, address.id)
    }

    /// Seed a vendor with one available product at the given base price.
    pub async fn seed_vendor_with_product(
        &self,
        store_name: &str,
        product_name: &str,
        base_price: i64,
    ) -> (VendorId, ProductId) {
        let vendor = self.store.seed_vendor(store_name).await;
        let product = self
            .store
            .seed_product(vendor.id, product_name, Decimal::from(base_price), true)
            .await;
        (vendor.id, product.id)
    }

    /// Add a product to the customer's cart.
    pub async fn add_to_cart(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
        options: &[SelectedOption],
    ) {
        self.state
            .cart_service()
            .add_line(customer_id, product_id, quantity, options)
            .await
            .expect("add to cart");
    }

    /// Check out the customer's cart with cash-on-delivery defaults.
    pub async fn checkout(&self, customer_id: CustomerId, address_id: AddressId) -> Order {
        self.state
            .order_service()
            .create_order(
                customer_id,
                CreateOrderRequest {
                    address_id,
                    payment_method: "COD".to_string(),
                    notes: None,
                },
            )
            .await
            .expect("checkout")
    }
}

impl Default for TestMarket {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a tracing subscriber honoring `RUST_LOG`, once per process.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mekong_marketplace=info".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Notifier that records deliveries in publish order and fails for
/// configured topics.
#[derive(Default)]
pub struct RecordingNotifier {
    failing_topics: Mutex<Vec<String>>,
    delivered: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingNotifier {
    /// Create a notifier that delivers everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all future publishes to a topic.
    pub async fn fail_topic(&self, topic: String) {
        self.failing_topics.lock().await.push(topic);
    }

    /// Deliveries observed so far, in publish order.
    pub async fn delivered(&self) -> Vec<(String, serde_json::Value)> {
        self.delivered.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), NotifyError> {
        if self
            .failing_topics
            .lock()
            .await
            .iter()
            .any(|failing| failing == topic)
        {
            return Err(NotifyError::Publish {
                topic: topic.to_string(),
                reason: "simulated outage".to_string(),
            });
        }
        self.delivered
            .lock()
            .await
            .push((topic.to_string(), payload));
        Ok(())
    }
}
