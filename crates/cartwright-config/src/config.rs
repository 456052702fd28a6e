//! # Cartwright Configuration
//!
//! Logging filter, invoice numbering and the default order-total pipeline.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARTWRIGHT_LOG_FILTER=debug                                        │
//! │     CARTWRIGHT_INVOICE_START=1000                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cartwright/cartwright.toml (Linux)                       │
//! │     ~/Library/Application Support/rs.cartwright.cartwright/... (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     filter "info,cartwright=debug", invoice start 1, no order totals   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [logging]
//! filter = "info,cartwright=debug"
//!
//! [invoice]
//! start = 1000
//!
//! [[order_totals]]
//! kind = "flat"
//! name = "Shipping"
//! description = "Flat-rate shipping"
//! amount_cents = 500
//! active = true
//!
//! [[order_totals]]
//! kind = "percentage"
//! name = "GST"
//! description = "Goods and services tax"
//! bps = 1000
//! active = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use cartwright_core::{
    seed_invoice_counter, BoxedOrderTotal, Cart, CartStore, FlatAdjustment, Money, OrderTotal,
    OrderTotalCollection, PercentageAdjustment,
};

use crate::error::{ConfigError, ConfigResult};

/// 100% in basis points.
pub const MAX_BPS: i64 = 10_000;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "cartwright.toml";

// =============================================================================
// Logging
// =============================================================================

/// Tracing filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info,cartwright=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// Invoice numbering for the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// First invoice id handed out. Must be at least 1.
    #[serde(default = "default_invoice_start")]
    pub start: u64,
}

fn default_invoice_start() -> u64 {
    1
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        InvoiceConfig {
            start: default_invoice_start(),
        }
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// One configured order total, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderTotalConfig {
    /// Fixed amount; negative for discounts.
    Flat {
        name: String,
        #[serde(default)]
        description: String,
        amount_cents: i64,
        #[serde(default)]
        active: bool,
    },
    /// Basis points of the sub-total; negative for discounts.
    Percentage {
        name: String,
        #[serde(default)]
        description: String,
        bps: i64,
        #[serde(default)]
        active: bool,
    },
}

impl OrderTotalConfig {
    pub fn name(&self) -> &str {
        match self {
            OrderTotalConfig::Flat { name, .. } | OrderTotalConfig::Percentage { name, .. } => name,
        }
    }

    /// Builds the calculator this entry describes.
    pub fn build<S: CartStore>(&self) -> BoxedOrderTotal<S> {
        match self {
            OrderTotalConfig::Flat {
                name,
                description,
                amount_cents,
                active,
            } => {
                let mut calculator =
                    FlatAdjustment::new(name.as_str(), description.as_str(), Money::from_cents(*amount_cents));
                OrderTotal::<S>::set_active(&mut calculator, *active);
                Box::new(calculator)
            }
            OrderTotalConfig::Percentage {
                name,
                description,
                bps,
                active,
            } => {
                let mut calculator = PercentageAdjustment::new(name.as_str(), description.as_str(), *bps);
                OrderTotal::<S>::set_active(&mut calculator, *active);
                Box::new(calculator)
            }
        }
    }
}

// =============================================================================
// Main Config
// =============================================================================

/// Complete Cartwright configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartwrightConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub invoice: InvoiceConfig,

    /// Default pipeline for new carts.
    #[serde(default)]
    pub order_totals: Vec<OrderTotalConfig>,
}

impl CartwrightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`cartwright.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cartwright config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cartwright config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cartwright config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.invoice.start == 0 {
            return Err(ConfigError::Invalid("invoice.start must be at least 1".into()));
        }

        for (index, entry) in self.order_totals.iter().enumerate() {
            if entry.name().trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "order_totals[{}] needs a name",
                    index
                )));
            }
            if let OrderTotalConfig::Percentage { name, bps, .. } = entry {
                if bps.abs() > MAX_BPS {
                    return Err(ConfigError::Invalid(format!(
                        "order total {} has {} bps, limit is {}",
                        name, bps, MAX_BPS
                    )));
                }
            }
        }

        Ok(())
    }

    /// The configured pipeline, in file order.
    pub fn build_order_totals<S: CartStore>(&self) -> OrderTotalCollection<S> {
        self.order_totals.iter().map(|entry| entry.build::<S>()).collect()
    }

    /// Wraps `store` in a cart seeded with the configured pipeline.
    pub fn build_cart<S: CartStore>(&self, store: S) -> Cart<S> {
        let mut cart = Cart::new(store);
        cart.set_order_totals(self.build_order_totals());
        cart
    }

    /// Moves the in-memory invoice counter up to `invoice.start`.
    pub fn apply_invoice_start(&self) {
        seed_invoice_counter(self.invoice.start);
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup("CARTWRIGHT_LOG_FILTER") {
            debug!(filter = %filter, "Overriding log filter from environment");
            self.logging.filter = filter;
        }

        if let Some(start) = lookup("CARTWRIGHT_INVOICE_START") {
            match start.parse::<u64>() {
                Ok(parsed) => {
                    debug!(start = parsed, "Overriding invoice start from environment");
                    self.invoice.start = parsed;
                }
                Err(_) => warn!(start = %start, "Ignoring non-numeric invoice start in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("rs", "cartwright", "cartwright")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartwright_core::{MemoryItem, MemoryStore};

    const SAMPLE: &str = r#"
[logging]
filter = "warn"

[invoice]
start = 42

[[order_totals]]
kind = "flat"
name = "Shipping"
description = "Flat-rate shipping"
amount_cents = 500
active = true

[[order_totals]]
kind = "percentage"
name = "GST"
bps = 1000
active = true

[[order_totals]]
kind = "flat"
name = "Voucher"
amount_cents = -300
"#;

    #[test]
    fn test_default_config() {
        let config = CartwrightConfig::default();
        assert_eq!(config.logging.filter, "info,cartwright=debug");
        assert_eq!(config.invoice.start, 1);
        assert!(config.order_totals.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let config: CartwrightConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.invoice.start, 42);
        assert_eq!(config.order_totals.len(), 3);
        assert_eq!(
            config.order_totals[2],
            OrderTotalConfig::Flat {
                name: "Voucher".into(),
                description: String::new(),
                amount_cents: -300,
                active: false,
            }
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: CartwrightConfig = toml::from_str("[invoice]\nstart = 7\n").unwrap();
        assert_eq!(config.invoice.start, 7);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<CartwrightConfig, _> =
            toml::from_str("[[order_totals]]\nkind = \"bogus\"\nname = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config: CartwrightConfig = toml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());

        config.invoice.start = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.invoice.start = 1;

        config.order_totals.push(OrderTotalConfig::Percentage {
            name: "Silly".into(),
            description: String::new(),
            bps: 10_001,
            active: true,
        });
        assert!(config.validate().is_err());
        config.order_totals.pop();

        config.order_totals.push(OrderTotalConfig::Flat {
            name: "  ".into(),
            description: String::new(),
            amount_cents: 1,
            active: true,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_order_totals_keeps_file_order() {
        let config: CartwrightConfig = toml::from_str(SAMPLE).unwrap();
        let mut cart = config.build_cart(MemoryStore::new());
        cart.add_to_cart(&MemoryItem::new(1, "Tea", Money::from_cents(2000)), 1)
            .unwrap();

        assert_eq!(cart.order_totals().names(), vec!["Shipping", "GST", "Voucher"]);
        // 2000 + 500 shipping + 200 GST, voucher inactive
        assert_eq!(cart.total().cents(), 2700);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CartwrightConfig::default();
        config.apply_overrides_from(|key| match key {
            "CARTWRIGHT_LOG_FILTER" => Some("trace".to_string()),
            "CARTWRIGHT_INVOICE_START" => Some("900".to_string()),
            _ => None,
        });
        assert_eq!(config.logging.filter, "trace");
        assert_eq!(config.invoice.start, 900);

        config.apply_overrides_from(|key| {
            (key == "CARTWRIGHT_INVOICE_START").then(|| "lots".to_string())
        });
        assert_eq!(config.invoice.start, 900);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config: CartwrightConfig = toml::from_str(SAMPLE).unwrap();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[[order_totals]]"));

        let loaded = CartwrightConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.order_totals, config.order_totals);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[invoice]\nstart = 0\n").unwrap();

        assert!(matches!(
            CartwrightConfig::load(Some(path.clone())),
            Err(ConfigError::Invalid(_))
        ));
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            CartwrightConfig::load(Some(path.clone())),
            Err(ConfigError::Parse(_))
        ));

        // load_or_default swallows the failure
        assert_eq!(CartwrightConfig::load_or_default(Some(path)).invoice.start, 1);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CartwrightConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert!(config.order_totals.is_empty());
    }
}
