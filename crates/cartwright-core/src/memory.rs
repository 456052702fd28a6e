//! # In-Memory Reference Store
//!
//! [`MemoryStore`] keeps cart lines in a `Vec` and lives as long as its owner.
//! Useful for desktop apps, tests, and as the reference a persistent store
//! is checked against.
//!
//! ## Invoice Numbers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NEXT_INVOICE_ID (process-global AtomicU64, starts at 1)                │
//! │                                                                         │
//! │  MemoryStore::new() ──► fetch_add(1) ──► invoice_id = 1                 │
//! │  MemoryStore::new() ──► fetch_add(1) ──► invoice_id = 2                 │
//! │                                                                         │
//! │  seed_invoice_counter(n) moves the counter forward to at least n.       │
//! │                                                                         │
//! │  One id per store, taken at construction: unique per cart and          │
//! │  monotonic across carts for the lifetime of the process.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::CartResult;
use crate::item::{HookOptions, Item, RemoveQuantity};
use crate::lifecycle::{CartEvent, CartState, Lifecycle, LifecycleHooks};
use crate::money::Money;
use crate::store::{CartStore, PermissiveHooks, StoreCallbacks};

static NEXT_INVOICE_ID: AtomicU64 = AtomicU64::new(1);

/// Moves the global invoice counter forward so the next [`MemoryStore`] gets
/// an id of at least `start`. Never moves it backwards.
pub fn seed_invoice_counter(start: u64) {
    let previous = NEXT_INVOICE_ID.fetch_max(start, Ordering::SeqCst);
    debug!(start, previous, "Seeded invoice counter");
}

// =============================================================================
// Memory Item
// =============================================================================

/// Reference item: numeric id, name, price. Equality is by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: u64,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub quantity: i64,
}

impl MemoryItem {
    /// Creates an item with quantity 0.
    pub fn new(id: u64, name: impl Into<String>, price: Money) -> Self {
        MemoryItem {
            id,
            name: name.into(),
            price,
            quantity: 0,
        }
    }
}

impl PartialEq for MemoryItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MemoryItem {}

impl Item for MemoryItem {
    type Id = u64;

    fn id(&self) -> &u64 {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// A [`CartStore`] backed by a `Vec`.
///
/// Guards, enter/exit hooks and store callbacks are forwarded to `H`, so the
/// embedding application customises behaviour by supplying a hooks value
/// rather than writing a store.
///
/// ## Example
/// ```rust
/// use cartwright_core::{CartStore, MemoryItem, MemoryStore, Money, HookOptions};
///
/// let mut store = MemoryStore::new();
/// let tea = MemoryItem::new(1, "Tea", Money::from_cents(250));
/// store.add_to_cart(&tea, 2, &HookOptions::new()).unwrap();
/// assert_eq!(store.sub_total().cents(), 500);
/// ```
#[derive(Debug)]
pub struct MemoryStore<I, H = PermissiveHooks> {
    items: Vec<I>,
    lifecycle: Lifecycle,
    invoice_id: u64,
    hooks: H,
}

impl<I> MemoryStore<I, PermissiveHooks> {
    /// Creates an empty store in the `shopping` state.
    pub fn new() -> Self {
        Self::with_hooks(PermissiveHooks)
    }
}

impl<I> Default for MemoryStore<I, PermissiveHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, H> MemoryStore<I, H> {
    /// Creates an empty store that forwards its hook points to `hooks`.
    pub fn with_hooks(hooks: H) -> Self {
        let invoice_id = NEXT_INVOICE_ID.fetch_add(1, Ordering::SeqCst);
        debug!(invoice_id, "Created in-memory cart store");
        MemoryStore {
            items: Vec::new(),
            lifecycle: Lifecycle::new(),
            invoice_id,
            hooks,
        }
    }

    /// Rehydrates a store with existing lines and state.
    ///
    /// Lines are taken as given; the caller is responsible for identity
    /// uniqueness.
    pub fn from_parts(items: Vec<I>, state: CartState, hooks: H) -> Self {
        let mut store = Self::with_hooks(hooks);
        store.items = items;
        store.lifecycle = Lifecycle::resume(state);
        store
    }

    /// The hooks value.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable hooks value.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}

impl<I, H: LifecycleHooks> LifecycleHooks for MemoryStore<I, H> {
    fn guard(&self, event: CartEvent) -> bool {
        self.hooks.guard(event)
    }

    fn on_exit(&mut self, state: CartState) {
        self.hooks.on_exit(state);
    }

    fn on_enter(&mut self, state: CartState) {
        self.hooks.on_enter(state);
    }
}

impl<I, H> CartStore for MemoryStore<I, H>
where
    I: Item + Clone,
    H: LifecycleHooks + StoreCallbacks<I>,
{
    type Item = I;

    fn items(&self) -> &[I] {
        &self.items
    }

    fn items_mut(&mut self) -> &mut Vec<I> {
        &mut self.items
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn invoice_id(&self) -> CartResult<u64> {
        Ok(self.invoice_id)
    }

    fn before_add_to_cart(&mut self, item: &I, quantity: i64, options: &HookOptions) -> bool {
        self.hooks.before_add_to_cart(item, quantity, options)
    }

    fn after_add_to_cart(&mut self, item: &I, quantity: i64, options: &HookOptions) {
        self.hooks.after_add_to_cart(item, quantity, options);
    }

    fn before_remove_from_cart(
        &mut self,
        item: &I,
        quantity: RemoveQuantity,
        options: &HookOptions,
    ) -> bool {
        self.hooks.before_remove_from_cart(item, quantity, options)
    }

    fn after_remove_from_cart(&mut self, item: &I, quantity: RemoveQuantity, options: &HookOptions) {
        self.hooks.after_remove_from_cart(item, quantity, options);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, price_cents: i64) -> MemoryItem {
        MemoryItem::new(id, format!("Item {}", id), Money::from_cents(price_cents))
    }

    #[derive(Default)]
    struct Transitions {
        refuse_checkout: bool,
        log: Vec<String>,
    }

    impl LifecycleHooks for Transitions {
        fn guard(&self, event: CartEvent) -> bool {
            !(self.refuse_checkout && event == CartEvent::Checkout)
        }

        fn on_exit(&mut self, state: CartState) {
            self.log.push(format!("exit_{}", state));
        }

        fn on_enter(&mut self, state: CartState) {
            self.log.push(format!("enter_{}", state));
        }
    }

    impl StoreCallbacks<MemoryItem> for Transitions {}

    #[test]
    fn test_memory_item_equality_is_by_id() {
        assert_eq!(item(1, 10), item(1, 99));
        assert_ne!(item(1, 10), item(2, 10));
        assert_eq!(item(1, 10).quantity, 0);
    }

    #[test]
    fn test_invoice_ids_are_unique_and_increasing() {
        let first: MemoryStore<MemoryItem> = MemoryStore::new();
        let second: MemoryStore<MemoryItem> = MemoryStore::new();

        let a = first.invoice_id().unwrap();
        let b = second.invoice_id().unwrap();
        assert!(a >= 1);
        assert!(b > a);
        // stable for the lifetime of the store
        assert_eq!(first.invoice_id().unwrap(), a);
    }

    #[test]
    fn test_seed_invoice_counter_only_moves_forward() {
        seed_invoice_counter(5_000);
        let store: MemoryStore<MemoryItem> = MemoryStore::new();
        assert!(store.invoice_id().unwrap() >= 5_000);

        seed_invoice_counter(1);
        let later: MemoryStore<MemoryItem> = MemoryStore::new();
        assert!(later.invoice_id().unwrap() > store.invoice_id().unwrap());
    }

    #[test]
    fn test_transitions_forward_to_hooks() {
        let mut store: MemoryStore<MemoryItem, Transitions> =
            MemoryStore::with_hooks(Transitions::default());

        store.fire(CartEvent::Checkout).unwrap();
        store.fire(CartEvent::CheckPayment).unwrap();
        assert_eq!(store.state(), CartState::VerifyingPayment);
        assert_eq!(
            store.hooks().log,
            vec![
                "exit_shopping",
                "enter_checkout",
                "exit_checkout",
                "enter_verifying_payment"
            ]
        );
    }

    #[test]
    fn test_guard_refusal_is_not_an_error() {
        let mut store: MemoryStore<MemoryItem, Transitions> =
            MemoryStore::with_hooks(Transitions {
                refuse_checkout: true,
                ..Default::default()
            });

        assert_eq!(store.fire(CartEvent::Checkout), Ok(false));
        assert_eq!(store.state(), CartState::Shopping);
        assert!(store.hooks().log.is_empty());
    }

    #[test]
    fn test_from_parts_rehydrates() {
        let mut line = item(7, 300);
        line.quantity = 2;
        let store = MemoryStore::from_parts(vec![line], CartState::Checkout, PermissiveHooks);

        assert_eq!(store.state(), CartState::Checkout);
        assert_eq!(store.quantity(), 2);
        assert_eq!(store.sub_total().cents(), 600);
    }
}
