//! Pricing engine: line prices and shipping fees.
//!
//! Pure computation, no store or network access. Line prices are computed
//! from the snapshot a cart line carries; the shipping fee is a policy
//! lookup over the destination city and the order subtotal.

use mekong_core::SelectedOption;
use rust_decimal::Decimal;

use crate::config::ShippingConfig;

/// Effective unit price for a line: base price plus the sum of the selected
/// options' adjustments.
///
/// Adjustments may be negative; the result is deliberately not clamped at
/// zero (a policy decision recorded in DESIGN.md).
#[must_use]
pub fn line_unit_price(base_price: Decimal, options: &[SelectedOption]) -> Decimal {
    options
        .iter()
        .fold(base_price, |price, option| price + option.price_adjustment)
}

/// Subtotal for a line.
#[must_use]
pub fn line_subtotal(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Shipping-fee policy evaluated in priority order.
///
/// City matching is a case-insensitive substring test against a fixed alias
/// list per bucket; the lists carry both accented and unaccented spellings
/// so either form of a destination matches.
#[derive(Debug, Clone)]
pub struct ShippingPolicy {
    free_shipping_threshold: Decimal,
    major_city_fee: Decimal,
    remote_area_fee: Decimal,
    standard_fee: Decimal,
    major_city_aliases: Vec<String>,
    remote_area_aliases: Vec<String>,
}

impl ShippingPolicy {
    /// Build a policy from configuration. Aliases are lowercased once here
    /// so `fee` only lowercases the destination.
    #[must_use]
    pub fn new(config: &ShippingConfig) -> Self {
        let lowercase = |aliases: &[String]| aliases.iter().map(|a| a.to_lowercase()).collect();
        Self {
            free_shipping_threshold: config.free_shipping_threshold,
            major_city_fee: config.major_city_fee,
            remote_area_fee: config.remote_area_fee,
            standard_fee: config.standard_fee,
            major_city_aliases: lowercase(&config.major_city_aliases),
            remote_area_aliases: lowercase(&config.remote_area_aliases),
        }
    }

    /// Compute the shipping fee for a destination and order subtotal.
    ///
    /// Rules, first match wins:
    /// 1. subtotal at or above the free-shipping threshold ships free,
    ///    regardless of destination;
    /// 2. major cities;
    /// 3. remote provinces;
    /// 4. everywhere else pays the standard fee.
    #[must_use]
    pub fn fee(&self, destination_city: &str, order_subtotal: Decimal) -> Decimal {
        if order_subtotal >= self.free_shipping_threshold {
            tracing::debug!(%order_subtotal, "free shipping threshold met");
            return Decimal::ZERO;
        }

        let city = destination_city.to_lowercase();
        let city = city.trim();

        if matches_any(city, &self.major_city_aliases) {
            tracing::debug!(city, fee = %self.major_city_fee, "major city shipping fee");
            return self.major_city_fee;
        }

        if matches_any(city, &self.remote_area_aliases) {
            tracing::debug!(city, fee = %self.remote_area_fee, "remote area shipping fee");
            return self.remote_area_fee;
        }

        tracing::debug!(city, fee = %self.standard_fee, "standard shipping fee");
        self.standard_fee
    }
}

fn matches_any(city: &str, aliases: &[String]) -> bool {
    aliases.iter().any(|alias| city.contains(alias.as_str()))
}
