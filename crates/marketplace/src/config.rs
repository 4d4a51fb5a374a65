//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; defaults match production policy.
//!
//! - `MARKETPLACE_FREE_SHIPPING_THRESHOLD` - Subtotal at which shipping is
//!   free (default: 100000)
//! - `MARKETPLACE_MAJOR_CITY_FEE` - Fee for major cities (default: 30000)
//! - `MARKETPLACE_REMOTE_AREA_FEE` - Fee for remote provinces (default: 35000)
//! - `MARKETPLACE_STANDARD_FEE` - Fee everywhere else (default: 20000)
//! - `MARKETPLACE_NOTIFICATION_BUFFER` - Per-topic broadcast buffer size
//!   (default: 64)

use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace application configuration.
#[derive(Debug, Clone, Default)]
pub struct MarketplaceConfig {
    /// Shipping-fee policy knobs.
    pub shipping: ShippingConfig,
    /// Per-topic buffer size for the in-process notification broker.
    pub notification_buffer: NotificationBuffer,
}

/// Shipping-fee policy configuration.
///
/// Alias lists hold both accented and unaccented spellings of each place
/// name; matching is case-insensitive substring containment.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    /// Order subtotal at or above which shipping is free.
    pub free_shipping_threshold: Decimal,
    /// Fee for destinations matching the major-city aliases.
    pub major_city_fee: Decimal,
    /// Fee for destinations matching the remote-province aliases.
    pub remote_area_fee: Decimal,
    /// Fee for every other destination.
    pub standard_fee: Decimal,
    /// Major-city name variants.
    pub major_city_aliases: Vec<String>,
    /// Remote-province name variants.
    pub remote_area_aliases: Vec<String>,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(100_000),
            major_city_fee: Decimal::from(30_000),
            remote_area_fee: Decimal::from(35_000),
            standard_fee: Decimal::from(20_000),
            major_city_aliases: to_strings(&[
                "hà nội",
                "ha noi",
                "hồ chí minh",
                "ho chi minh",
                "tp.hcm",
                "sài gòn",
                "saigon",
                "đà nẵng",
                "da nang",
            ]),
            remote_area_aliases: to_strings(&[
                "lai châu",
                "điện biên",
                "sơn la",
                "hà giang",
                "cao bằng",
                "bắc kạn",
                "lào cai",
            ]),
        }
    }
}

/// Per-topic broadcast buffer size.
#[derive(Debug, Clone, Copy)]
pub struct NotificationBuffer(pub usize);

impl Default for NotificationBuffer {
    fn default() -> Self {
        Self(64)
    }
}

impl MarketplaceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            shipping: ShippingConfig::from_env()?,
            notification_buffer: NotificationBuffer(get_parsed_or_default(
                "MARKETPLACE_NOTIFICATION_BUFFER",
                64,
            )?),
        })
    }
}

impl ShippingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            free_shipping_threshold: get_parsed_or_default(
                "MARKETPLACE_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            major_city_fee: get_parsed_or_default(
                "MARKETPLACE_MAJOR_CITY_FEE",
                defaults.major_city_fee,
            )?,
            remote_area_fee: get_parsed_or_default(
                "MARKETPLACE_REMOTE_AREA_FEE",
                defaults.remote_area_fee,
            )?,
            standard_fee: get_parsed_or_default(
                "MARKETPLACE_STANDARD_FEE",
                defaults.standard_fee,
            )?,
            major_city_aliases: defaults.major_city_aliases,
            remote_area_aliases: defaults.remote_area_aliases,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
