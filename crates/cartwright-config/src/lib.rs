//! # cartwright-config: Configuration and Telemetry
//!
//! The ambient layer around `cartwright-core`: TOML configuration with
//! environment overrides, and tracing subscriber setup.
//!
//! ## Usage
//! ```rust,no_run
//! use cartwright_config::{init_tracing, CartwrightConfig};
//! use cartwright_core::{MemoryItem, MemoryStore};
//!
//! let config = CartwrightConfig::load_or_default(None);
//! init_tracing(&config.logging);
//! config.apply_invoice_start();
//!
//! let cart = config.build_cart(MemoryStore::<MemoryItem>::new());
//! println!("{}", cart.total());
//! ```

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{CartwrightConfig, InvoiceConfig, LoggingConfig, OrderTotalConfig};
pub use error::{ConfigError, ConfigResult};
pub use telemetry::init_tracing;
