//! Application state shared across the workflow services.

use std::sync::Arc;

use crate::config::MarketplaceConfig;
use crate::notify::{BroadcastNotifier, NotificationService, Notifier};
use crate::pricing::ShippingPolicy;
use crate::services::{AddressService, CartService, OrderService};
use crate::stores::{MemoryStore, Stores};

/// Application state shared across the workflow services.
///
/// Cheaply cloneable via `Arc`; hands out configured service instances
/// wired to the same store handles and notifier.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketplaceConfig,
    stores: Stores,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create application state over explicit collaborators.
    #[must_use]
    pub fn new(config: MarketplaceConfig, stores: Stores, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                notifier,
            }),
        }
    }

    /// Create application state backed entirely in-process: a shared
    /// [`MemoryStore`] and a [`BroadcastNotifier`].
    ///
    /// Returns the concrete store and broker so callers can seed data and
    /// subscribe to topics.
    #[must_use]
    pub fn in_memory(config: MarketplaceConfig) -> (Self, Arc<MemoryStore>, Arc<BroadcastNotifier>) {
        let (stores, store) = Stores::in_memory();
        let notifier = Arc::new(BroadcastNotifier::new(config.notification_buffer.0));
        let state = Self::new(config, stores, notifier.clone());
        (state, store, notifier)
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.inner.config
    }

    /// Get a reference to the store bundle.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Build an order service.
    #[must_use]
    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            self.inner.stores.clone(),
            ShippingPolicy::new(&self.inner.config.shipping),
            NotificationService::new(self.inner.notifier.clone()),
        )
    }

    /// Build a cart service.
    #[must_use]
    pub fn cart_service(&self) -> CartService {
        CartService::new(
            self.inner.stores.catalog.clone(),
            self.inner.stores.carts.clone(),
        )
    }

    /// Build an address service.
    #[must_use]
    pub fn address_service(&self) -> AddressService {
        AddressService::new(self.inner.stores.addresses.clone())
    }
}
