//! # cartwright-core: Shopping Cart Engine
//!
//! This crate is the **heart** of Cartwright. It contains the cart domain
//! logic with zero I/O dependencies: items, stores, the checkout lifecycle
//! and the order-total pipeline.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cartwright Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Embedding Application                          │   │
//! │  │   persistence store ──► pricing calculators ──► hooks          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ cartwright-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   item    │  │   store   │  │ lifecycle │  │order_total│  │   │
//! │  │   │   Item    │  │ CartStore │  │ CartState │  │OrderTotal │  │   │
//! │  │   │  Money    │  │MemoryStore│  │ CartEvent │  │Collection │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                         ▲ composed by ▲                         │   │
//! │  │                        ┌──────────────┐                         │   │
//! │  │                        │  cart::Cart  │                         │   │
//! │  │                        └──────────────┘                         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO GLOBAL SUBSCRIBER      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              cartwright-config (Ambient Layer)                  │   │
//! │  │          TOML config, env overrides, tracing, cart-demo         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`item`] - The `Item` contract and item-level hooks
//! - [`lifecycle`] - Checkout state machine
//! - [`store`] - The `CartStore` contract
//! - [`memory`] - In-memory reference store and item
//! - [`order_total`] - Pluggable total calculators
//! - [`cart`] - The `Cart` facade
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cartwright_core::{Cart, CartState, MemoryItem, MemoryStore, Money, PercentageAdjustment};
//!
//! let mut cart = Cart::setup(MemoryStore::new(), |totals| {
//!     totals.push(PercentageAdjustment::new("GST", "10%", 1000).activated());
//! });
//!
//! cart.add_to_cart(&MemoryItem::new(1, "Coffee", Money::from_cents(450)), 2).unwrap();
//! assert_eq!(cart.total().cents(), 990);
//!
//! cart.checkout().unwrap();
//! cart.check_payment().unwrap();
//! cart.payment_successful().unwrap();
//! assert_eq!(cart.state(), CartState::Completed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod item;
pub mod lifecycle;
pub mod memory;
pub mod money;
pub mod order_total;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cartwright_core::Money` instead of
// `use cartwright_core::money::Money`

pub use cart::{Cart, CartOutcome, CartSummary};
pub use error::{CartError, CartResult};
pub use item::{HookOptions, Item, RemoveQuantity};
pub use lifecycle::{CartEvent, CartState, Lifecycle, LifecycleHooks};
pub use memory::{seed_invoice_counter, MemoryItem, MemoryStore};
pub use money::Money;
pub use order_total::{
    BoxedOrderTotal, FlatAdjustment, OrderTotal, OrderTotalCollection, OrderTotalLine,
    PercentageAdjustment,
};
pub use store::{CartStore, PermissiveHooks, StoreCallbacks};
