//! # Cart Facade
//!
//! [`Cart`] composes one [`CartStore`] with one [`OrderTotalCollection`] and
//! runs the cancellable callback protocol around every mutation.
//!
//! ## Callback Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart.add_to_cart(item, qty)                                            │
//! │                                                                         │
//! │  1. item.before_add_to_cart(qty, opts)        false ──► Cancelled       │
//! │  2. store.before_add_to_cart(item, qty, opts) false ──► Cancelled       │
//! │  3. store.add_to_cart(item, qty, opts)        (the only mutation)       │
//! │  4. store.after_add_to_cart(item, qty, opts)                            │
//! │  5. item.after_add_to_cart(qty, opts)                                   │
//! │                                                                         │
//! │  ──► Applied                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Removal runs the same five steps with the `*_remove_from_cart` hooks.
//! `update_cart` resolves to an add or a remove of the delta and runs that.
//!
//! ## Event Dispatch
//! Events can be fired by name (`cart.fire("checkout")`). Names resolve
//! through a table built once from [`CartStore::declared_events`]; anything
//! else is [`CartError::UnknownEvent`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::error::{CartError, CartResult};
use crate::item::{HookOptions, Item, RemoveQuantity};
use crate::lifecycle::{CartEvent, CartState};
use crate::money::Money;
use crate::order_total::{OrderTotalCollection, OrderTotalLine};
use crate::store::CartStore;

// =============================================================================
// Outcome & Summary
// =============================================================================

/// Result of a cancellable mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The mutation ran and every after-hook was notified.
    Applied,
    /// A before-hook vetoed the mutation. Nothing changed.
    Cancelled,
}

impl CartOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CartOutcome::Applied)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CartOutcome::Cancelled)
    }
}

/// Serialisable snapshot of a cart, for invoices and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    /// `None` when the store cannot produce one.
    pub invoice_id: Option<u64>,
    pub state: CartState,
    pub lines: usize,
    pub quantity: i64,
    pub sub_total: Money,
    pub adjustment: Money,
    pub total: Money,
    /// Active order totals in pipeline order.
    pub order_totals: Vec<OrderTotalLine>,
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Add(i64),
    Remove(RemoveQuantity),
}

// =============================================================================
// Cart
// =============================================================================

/// A store plus its order-total pipeline.
///
/// ## Example
/// ```rust
/// use cartwright_core::{Cart, FlatAdjustment, MemoryItem, MemoryStore, Money};
///
/// let mut cart = Cart::setup(MemoryStore::new(), |totals| {
///     totals.push(FlatAdjustment::new("Shipping", "Flat rate", Money::from_cents(500)).activated());
/// });
///
/// let tea = MemoryItem::new(1, "Tea", Money::from_cents(250));
/// assert!(cart.add_to_cart(&tea, 2).unwrap().is_applied());
/// assert_eq!(cart.total().cents(), 1000);
///
/// cart.fire("checkout").unwrap();
/// assert_eq!(cart.state().as_str(), "checkout");
/// ```
pub struct Cart<S: CartStore> {
    store: S,
    order_totals: OrderTotalCollection<S>,
    events: HashMap<&'static str, CartEvent>,
}

impl<S: CartStore> Cart<S> {
    /// Wraps `store` with an empty pipeline.
    pub fn new(store: S) -> Self {
        let events = store
            .declared_events()
            .into_iter()
            .map(|event| (event.as_str(), event))
            .collect();

        Cart {
            store,
            order_totals: OrderTotalCollection::new(),
            events,
        }
    }

    /// Wraps `store` and lets `configure` seed the pipeline.
    pub fn setup<F>(store: S, configure: F) -> Self
    where
        F: FnOnce(&mut OrderTotalCollection<S>),
    {
        let mut cart = Self::new(store);
        configure(&mut cart.order_totals);
        cart
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    /// Sub-total plus every active adjustment.
    pub fn total(&self) -> Money {
        self.store.sub_total() + self.adjustment()
    }

    /// Sum of the active adjustments alone.
    pub fn adjustment(&self) -> Money {
        self.order_totals.total(self)
    }

    pub fn sub_total(&self) -> Money {
        self.store.sub_total()
    }

    pub fn quantity(&self) -> i64 {
        self.store.quantity()
    }

    pub fn invoice_id(&self) -> CartResult<u64> {
        self.store.invoice_id()
    }

    pub fn order_totals(&self) -> &OrderTotalCollection<S> {
        &self.order_totals
    }

    pub fn order_totals_mut(&mut self) -> &mut OrderTotalCollection<S> {
        &mut self.order_totals
    }

    /// Replaces the pipeline, returning the old one.
    pub fn set_order_totals(&mut self, order_totals: OrderTotalCollection<S>) -> OrderTotalCollection<S> {
        std::mem::replace(&mut self.order_totals, order_totals)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Adds `quantity` units of `item` with empty options.
    pub fn add_to_cart(&mut self, item: &S::Item, quantity: i64) -> CartResult<CartOutcome> {
        self.add_to_cart_with(item, quantity, &HookOptions::new())
    }

    pub fn add_to_cart_with(
        &mut self,
        item: &S::Item,
        quantity: i64,
        options: &HookOptions,
    ) -> CartResult<CartOutcome> {
        self.apply(item, Mutation::Add(quantity), options)
    }

    /// Removes units of `item` with empty options. Accepts a plain count or
    /// [`RemoveQuantity::All`].
    pub fn remove_from_cart(
        &mut self,
        item: &S::Item,
        quantity: impl Into<RemoveQuantity>,
    ) -> CartResult<CartOutcome> {
        self.remove_from_cart_with(item, quantity, &HookOptions::new())
    }

    pub fn remove_from_cart_with(
        &mut self,
        item: &S::Item,
        quantity: impl Into<RemoveQuantity>,
        options: &HookOptions,
    ) -> CartResult<CartOutcome> {
        self.apply(item, Mutation::Remove(quantity.into()), options)
    }

    /// Sets the line for `item` to an absolute quantity.
    pub fn update_cart(&mut self, item: &S::Item, quantity: i64) -> CartResult<CartOutcome> {
        self.update_cart_with(item, quantity, &HookOptions::new())
    }

    pub fn update_cart_with(
        &mut self,
        item: &S::Item,
        quantity: i64,
        options: &HookOptions,
    ) -> CartResult<CartOutcome> {
        let mutation = match self.store.position(item) {
            Some(index) => {
                let overflow = || CartError::QuantityOverflow(format!("{:?}", item.id()));
                let diff = quantity
                    .checked_sub(self.store.items()[index].quantity())
                    .ok_or_else(overflow)?;
                if diff < 0 {
                    Mutation::Remove(RemoveQuantity::Units(diff.checked_neg().ok_or_else(overflow)?))
                } else {
                    Mutation::Add(diff)
                }
            }
            None => Mutation::Add(quantity),
        };
        self.apply(item, mutation, options)
    }

    fn apply(
        &mut self,
        item: &S::Item,
        mutation: Mutation,
        options: &HookOptions,
    ) -> CartResult<CartOutcome> {
        match mutation {
            Mutation::Add(quantity) => {
                if !item.before_add_to_cart(quantity, options) {
                    debug!(id = ?item.id(), quantity, "Add cancelled by item");
                    return Ok(CartOutcome::Cancelled);
                }
                if !self.store.before_add_to_cart(item, quantity, options) {
                    debug!(id = ?item.id(), quantity, "Add cancelled by store");
                    return Ok(CartOutcome::Cancelled);
                }

                self.store.add_to_cart(item, quantity, options)?;

                self.store.after_add_to_cart(item, quantity, options);
                item.after_add_to_cart(quantity, options);
            }
            Mutation::Remove(quantity) => {
                if !item.before_remove_from_cart(quantity, options) {
                    debug!(id = ?item.id(), %quantity, "Remove cancelled by item");
                    return Ok(CartOutcome::Cancelled);
                }
                if !self.store.before_remove_from_cart(item, quantity, options) {
                    debug!(id = ?item.id(), %quantity, "Remove cancelled by store");
                    return Ok(CartOutcome::Cancelled);
                }

                self.store.remove_from_cart(item, quantity, options)?;

                self.store.after_remove_from_cart(item, quantity, options);
                item.after_remove_from_cart(quantity, options);
            }
        }
        Ok(CartOutcome::Applied)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    pub fn state(&self) -> CartState {
        self.store.state()
    }

    /// Fires the event registered under `name`. A trailing `!` is ignored.
    ///
    /// ## Errors
    /// - `UnknownEvent` if the store does not declare an event of that name
    /// - `InvalidTransition` if the event cannot fire from the current state
    pub fn fire(&mut self, name: &str) -> CartResult<bool> {
        let key = name.strip_suffix('!').unwrap_or(name);
        let event = self
            .events
            .get(key)
            .copied()
            .ok_or_else(|| CartError::UnknownEvent(name.to_string()))?;
        self.store.fire(event)
    }

    /// Event names this cart dispatches, sorted.
    pub fn event_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.events.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn continue_shopping(&mut self) -> CartResult<bool> {
        self.store.fire(CartEvent::ContinueShopping)
    }

    pub fn checkout(&mut self) -> CartResult<bool> {
        self.store.fire(CartEvent::Checkout)
    }

    pub fn check_payment(&mut self) -> CartResult<bool> {
        self.store.fire(CartEvent::CheckPayment)
    }

    pub fn payment_successful(&mut self) -> CartResult<bool> {
        self.store.fire(CartEvent::PaymentSuccessful)
    }

    pub fn payment_failed(&mut self) -> CartResult<bool> {
        self.store.fire(CartEvent::PaymentFailed)
    }

    // -------------------------------------------------------------------------
    // Collection forwarding
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[S::Item] {
        self.store.items()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&S::Item> {
        self.store.get(index)
    }

    pub fn first(&self) -> Option<&S::Item> {
        self.store.first()
    }

    pub fn last(&self) -> Option<&S::Item> {
        self.store.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S::Item> {
        self.store.iter()
    }

    pub fn contains(&self, item: &S::Item) -> bool {
        self.store.contains(item)
    }

    pub fn position(&self, item: &S::Item) -> Option<usize> {
        self.store.position(item)
    }

    /// Appends a line as-is, bypassing the callback protocol.
    pub fn push(&mut self, item: S::Item) -> CartResult<()> {
        self.store.push(item)
    }

    pub fn delete_at(&mut self, index: usize) -> Option<S::Item> {
        self.store.delete_at(index)
    }

    pub fn pop(&mut self) -> Option<S::Item> {
        self.store.pop()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    // -------------------------------------------------------------------------
    // Store access
    // -------------------------------------------------------------------------

    /// Read-only view of the store. There is no mutable counterpart: every
    /// write goes through the callback protocol or the identity-checked
    /// collection methods above.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hands the store back, dropping the pipeline.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Snapshot for invoices and logs.
    pub fn summary(&self) -> CartSummary {
        let adjustment = self.adjustment();
        let sub_total = self.store.sub_total();

        CartSummary {
            invoice_id: self.store.invoice_id().ok(),
            state: self.store.state(),
            lines: self.store.len(),
            quantity: self.store.quantity(),
            sub_total,
            adjustment,
            total: sub_total + adjustment,
            order_totals: self.order_totals.lines(self),
        }
    }
}

impl<S: CartStore + fmt::Debug> fmt::Debug for Cart<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("store", &self.store)
            .field("order_totals", &self.order_totals)
            .finish()
    }
}

impl<'a, S: CartStore> IntoIterator for &'a Cart<S> {
    type Item = &'a S::Item;
    type IntoIter = std::slice::Iter<'a, S::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.store.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
