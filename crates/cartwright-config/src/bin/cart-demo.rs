//! # cart-demo
//!
//! Walks one cart through a full checkout using the configured pipeline.
//!
//! ```text
//! load config ──► init tracing ──► seed invoice counter
//!      │
//!      ▼
//! Cart<MemoryStore> ──► add items ──► checkout ──► check_payment
//!                                                      │
//!                       log summary JSON ◄── payment_successful
//! ```
//!
//! Usage: `cart-demo [path/to/cartwright.toml]`

use std::path::PathBuf;

use tracing::{info, warn};

use cartwright_config::{init_tracing, CartwrightConfig, ConfigResult};
use cartwright_core::{MemoryItem, MemoryStore, Money, RemoveQuantity};

fn main() -> ConfigResult<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = CartwrightConfig::load(config_path)?;

    init_tracing(&config.logging);
    config.apply_invoice_start();
    info!(order_totals = config.order_totals.len(), "Configuration loaded");

    let mut cart = config.build_cart(MemoryStore::<MemoryItem>::new());
    info!(invoice_id = cart.invoice_id()?, "Cart created");

    let coffee = MemoryItem::new(1, "Coffee beans", Money::from_cents(1450));
    let filter = MemoryItem::new(2, "Paper filters", Money::from_cents(399));
    let mug = MemoryItem::new(3, "Mug", Money::from_cents(1200));

    cart.add_to_cart(&coffee, 2)?;
    cart.add_to_cart(&filter, 1)?;
    cart.add_to_cart(&mug, 1)?;
    cart.update_cart(&filter, 3)?;
    cart.remove_from_cart(&mug, RemoveQuantity::All)?;

    info!(
        lines = cart.len(),
        quantity = cart.quantity(),
        sub_total = %cart.sub_total(),
        total = %cart.total(),
        "Cart ready for checkout"
    );

    for event in ["checkout", "check_payment", "payment_successful"] {
        if !cart.fire(event)? {
            warn!(event, "Transition refused by guard");
        }
    }

    let summary = serde_json::to_string_pretty(&cart.summary())?;
    info!(state = %cart.state(), "Checkout finished");
    println!("{}", summary);

    Ok(())
}
