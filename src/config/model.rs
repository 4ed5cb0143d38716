//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Who is selling, and how to reach them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,
    #[serde(default = "default_phone")]
    pub phone: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Replaces the bundled menu when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            phone: default_phone(),
            currency: default_currency(),
            catalog_path: None,
        }
    }
}

/// Delivery pricing. Amounts are decimal currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_min_order")]
    pub min_order: f64,
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: f64,
    #[serde(default = "default_free_delivery_threshold")]
    pub free_delivery_threshold: f64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            min_order: default_min_order(),
            delivery_fee: default_delivery_fee(),
            free_delivery_threshold: default_free_delivery_threshold(),
            tax_rate: default_tax_rate(),
        }
    }
}

/// Swipe recognition. Distances are in points; terminal cells are scaled by
/// `cell_width`/`cell_height`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    #[serde(default = "default_horizontal_threshold")]
    pub horizontal_threshold: f64,
    #[serde(default = "default_vertical_threshold")]
    pub vertical_threshold: f64,
    #[serde(default = "default_delete_threshold")]
    pub delete_threshold: f64,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,
    #[serde(default = "default_cell_height")]
    pub cell_height: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            horizontal_threshold: default_horizontal_threshold(),
            vertical_threshold: default_vertical_threshold(),
            delete_threshold: default_delete_threshold(),
            frame_interval_ms: default_frame_interval_ms(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Minimum movement before the direction changes.
    #[serde(default = "default_scroll_threshold")]
    pub threshold: f64,
    #[serde(default = "default_scroll_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_top_epsilon")]
    pub top_epsilon: f64,
    #[serde(default = "default_near_bottom_margin")]
    pub near_bottom_margin: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            threshold: default_scroll_threshold(),
            debounce_ms: default_scroll_debounce_ms(),
            top_epsilon: default_top_epsilon(),
            near_bottom_margin: default_near_bottom_margin(),
        }
    }
}

/// Notification lifetimes in milliseconds; zero or negative never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_ttl_short")]
    pub short_ms: i64,
    #[serde(default = "default_ttl_medium")]
    pub default_ms: i64,
    #[serde(default = "default_ttl_long")]
    pub long_ms: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            short_ms: default_ttl_short(),
            default_ms: default_ttl_medium(),
            long_ms: default_ttl_long(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long the detail view keeps its content while closing.
    #[serde(default = "default_detail_exit_ms")]
    pub detail_exit_ms: u64,
    /// Height of one catalog row in points, for scroll tracking.
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    /// Ring the terminal bell as haptic feedback.
    #[serde(default)]
    pub bell: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            detail_exit_ms: default_detail_exit_ms(),
            row_height: default_row_height(),
            bell: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cart_key: default_cart_key(),
        }
    }
}

/// Diagnostic log settings. The TUI owns stdout, so logs go to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_store_name() -> String {
    "Raisa's Chinese Food".to_string()
}
fn default_phone() -> String {
    "+1-437-566-6989".to_string()
}
fn default_currency() -> String {
    "CAD".to_string()
}
fn default_min_order() -> f64 {
    20.0
}
fn default_delivery_fee() -> f64 {
    4.99
}
fn default_free_delivery_threshold() -> f64 {
    40.0
}
fn default_tax_rate() -> f64 {
    0.13 // Ontario HST
}
fn default_horizontal_threshold() -> f64 {
    50.0
}
fn default_vertical_threshold() -> f64 {
    100.0
}
fn default_delete_threshold() -> f64 {
    80.0
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_cell_width() -> f64 {
    8.0
}
fn default_cell_height() -> f64 {
    16.0
}
fn default_scroll_threshold() -> f64 {
    10.0
}
fn default_scroll_debounce_ms() -> u64 {
    50
}
fn default_top_epsilon() -> f64 {
    10.0
}
fn default_near_bottom_margin() -> f64 {
    100.0
}
fn default_ttl_short() -> i64 {
    2000
}
fn default_ttl_medium() -> i64 {
    3000
}
fn default_ttl_long() -> i64 {
    5000
}
fn default_detail_exit_ms() -> u64 {
    300
}
fn default_row_height() -> f64 {
    16.0
}
fn default_data_dir() -> String {
    "~/.local/share/storefront".to_string()
}
fn default_cart_key() -> String {
    "storefront-cart".to_string()
}
fn default_log_dir() -> String {
    "~/.local/share/storefront/logs".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
