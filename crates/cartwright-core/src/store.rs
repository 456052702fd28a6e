//! # Cart Store
//!
//! The [`CartStore`] contract: an ordered, identity-unique list of items plus
//! the cart's lifecycle state.
//!
//! ## Quantity Collapsing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_to_cart(item, n)                                                   │
//! │    ├── line with same id exists?  ──► line.quantity += n                │
//! │    └── otherwise                  ──► clone item, quantity = n, append  │
//! │                                                                         │
//! │  remove_from_cart(item, n | All)                                        │
//! │    ├── no line with that id       ──► no-op (never an error)            │
//! │    ├── current - n > 0            ──► line.quantity -= n                │
//! │    └── otherwise                  ──► delete the line                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementing a Store
//! A storage collaborator provides the item list, the lifecycle holder and
//! an invoice id. Everything else has a default built on those, and can be
//! overridden when the collaborator needs to persist writes.

use tracing::{debug, warn};

use crate::error::{CartError, CartResult};
use crate::item::{HookOptions, Item, RemoveQuantity};
use crate::lifecycle::{CartEvent, CartState, Lifecycle, LifecycleHooks};
use crate::money::Money;

// =============================================================================
// Store Callbacks
// =============================================================================

/// Store-level before/after callbacks around add and remove.
///
/// Used by [`MemoryStore`](crate::memory::MemoryStore) to let the embedding
/// application plug in behaviour without writing a store.
pub trait StoreCallbacks<I: Item> {
    /// Veto point before an add. Returning false cancels it.
    fn before_add_to_cart(&mut self, item: &I, quantity: i64, options: &HookOptions) -> bool {
        let _ = (item, quantity, options);
        true
    }

    /// Notified after an add.
    fn after_add_to_cart(&mut self, item: &I, quantity: i64, options: &HookOptions) {
        let _ = (item, quantity, options);
    }

    /// Veto point before a remove. Returning false cancels it.
    fn before_remove_from_cart(
        &mut self,
        item: &I,
        quantity: RemoveQuantity,
        options: &HookOptions,
    ) -> bool {
        let _ = (item, quantity, options);
        true
    }

    /// Notified after a remove.
    fn after_remove_from_cart(&mut self, item: &I, quantity: RemoveQuantity, options: &HookOptions) {
        let _ = (item, quantity, options);
    }
}

/// Hooks that allow everything and observe nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveHooks;

impl LifecycleHooks for PermissiveHooks {}

impl<I: Item> StoreCallbacks<I> for PermissiveHooks {}

// =============================================================================
// Cart Store
// =============================================================================

/// An ordered, identity-unique collection of cart lines with a lifecycle.
///
/// ## Invariants
/// - No two entries share an identity
/// - `remove_from_cart` never leaves an entry at quantity 0
/// - The lifecycle state only changes through [`CartStore::fire`]
pub trait CartStore: LifecycleHooks {
    /// The line type held by this store.
    type Item: Item + Clone;

    // -------------------------------------------------------------------------
    // Required
    // -------------------------------------------------------------------------

    /// Entries in insertion order.
    fn items(&self) -> &[Self::Item];

    /// Mutable access to the entries for the provided operations.
    ///
    /// Raw access: writes through this vector skip the identity check that
    /// [`CartStore::push`] and [`CartStore::add_to_cart`] enforce, and skip
    /// every item and store callback. Callers outside the store should go
    /// through the provided operations or the [`Cart`](crate::cart::Cart)
    /// facade.
    fn items_mut(&mut self) -> &mut Vec<Self::Item>;

    /// The lifecycle holder.
    fn lifecycle(&self) -> &Lifecycle;

    /// Mutable lifecycle holder.
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Unique invoice id for this cart, generated by the storage collaborator.
    fn invoice_id(&self) -> CartResult<u64> {
        Err(CartError::NotImplemented("invoice_id"))
    }

    /// Events this store accepts by name. Defaults to all five.
    fn declared_events(&self) -> Vec<CartEvent> {
        CartEvent::ALL.to_vec()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Current lifecycle state.
    fn state(&self) -> CartState {
        self.lifecycle().state()
    }

    /// Fires a lifecycle event using this store's own guards and hooks.
    ///
    /// ## Returns
    /// - `Ok(true)` when the transition happened
    /// - `Ok(false)` when the guard refused it
    /// - `Err(UnknownEvent)` when the event is not in [`CartStore::declared_events`]
    /// - `Err(InvalidTransition)` when fired from a state outside its `From` set
    fn fire(&mut self, event: CartEvent) -> CartResult<bool> {
        if !self.declared_events().contains(&event) {
            warn!(event = %event, "Event not declared by this store");
            return Err(CartError::UnknownEvent(event.as_str().to_string()));
        }

        let from = self.state();
        let to = event.transition_from(from)?;

        if !self.guard(event) {
            debug!(event = %event, state = %from, "Store guard refused transition");
            return Ok(false);
        }

        self.on_exit(from);
        self.lifecycle_mut().advance(to);
        self.on_enter(to);

        debug!(event = %event, from = %from, to = %to, "Store transition");
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    /// Σ quantity × price over all entries. No rounding.
    fn sub_total(&self) -> Money {
        self.items().iter().map(|item| item.line_total()).sum()
    }

    /// Σ quantity over all entries.
    fn quantity(&self) -> i64 {
        self.items().iter().map(|item| item.quantity()).sum()
    }

    // -------------------------------------------------------------------------
    // Collection access
    // -------------------------------------------------------------------------

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn get(&self, index: usize) -> Option<&Self::Item> {
        self.items().get(index)
    }

    fn first(&self) -> Option<&Self::Item> {
        self.items().first()
    }

    fn last(&self) -> Option<&Self::Item> {
        self.items().last()
    }

    fn iter(&self) -> std::slice::Iter<'_, Self::Item> {
        self.items().iter()
    }

    /// Index of the line sharing `item`'s identity.
    fn position(&self, item: &Self::Item) -> Option<usize> {
        self.items().iter().position(|entry| entry.same_line(item))
    }

    /// Membership by identity.
    fn contains(&self, item: &Self::Item) -> bool {
        self.position(item).is_some()
    }

    /// Appends `item` as-is.
    ///
    /// ## Errors
    /// `DuplicateItem` if a line with the same identity exists; use
    /// [`CartStore::add_to_cart`] to merge quantities instead.
    fn push(&mut self, item: Self::Item) -> CartResult<()> {
        if self.contains(&item) {
            return Err(CartError::DuplicateItem(format!("{:?}", item.id())));
        }
        self.items_mut().push(item);
        Ok(())
    }

    /// Removes and returns the line at `index`, if any.
    fn delete_at(&mut self, index: usize) -> Option<Self::Item> {
        if index < self.len() {
            Some(self.items_mut().remove(index))
        } else {
            None
        }
    }

    /// Removes and returns the last line.
    fn pop(&mut self) -> Option<Self::Item> {
        self.items_mut().pop()
    }

    /// Removes every line. Lifecycle state is untouched.
    fn clear(&mut self) {
        self.items_mut().clear();
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Adds `quantity` units of `item`, merging into an existing line.
    ///
    /// Zero and negative quantities are applied as given.
    fn add_to_cart(
        &mut self,
        item: &Self::Item,
        quantity: i64,
        options: &HookOptions,
    ) -> CartResult<()> {
        let _ = options;
        match self.position(item) {
            Some(index) => {
                let entry = &mut self.items_mut()[index];
                let merged = entry
                    .quantity()
                    .checked_add(quantity)
                    .ok_or_else(|| CartError::QuantityOverflow(format!("{:?}", item.id())))?;
                entry.set_quantity(merged);
                debug!(id = ?item.id(), quantity, merged, "Merged into existing cart line");
            }
            None => {
                let mut entry = item.clone();
                entry.set_quantity(quantity);
                self.items_mut().push(entry);
                debug!(id = ?item.id(), quantity, "Appended cart line");
            }
        }
        Ok(())
    }

    /// Removes units of `item`, deleting the line when nothing would remain.
    ///
    /// Removing an item that is not in the cart is a no-op.
    fn remove_from_cart(
        &mut self,
        item: &Self::Item,
        quantity: RemoveQuantity,
        options: &HookOptions,
    ) -> CartResult<()> {
        let _ = options;
        let Some(index) = self.position(item) else {
            debug!(id = ?item.id(), "Remove ignored, item not in cart");
            return Ok(());
        };

        let entry = &mut self.items_mut()[index];
        let remaining = entry
            .quantity()
            .checked_sub(quantity.resolve(entry.quantity()))
            .ok_or_else(|| CartError::QuantityOverflow(format!("{:?}", item.id())))?;
        if remaining > 0 {
            entry.set_quantity(remaining);
            debug!(id = ?item.id(), %quantity, remaining, "Decremented cart line");
        } else {
            self.items_mut().remove(index);
            debug!(id = ?item.id(), %quantity, "Deleted cart line");
        }
        Ok(())
    }

    /// Sets the line for `item` to an absolute `quantity`.
    fn update_cart(
        &mut self,
        item: &Self::Item,
        quantity: i64,
        options: &HookOptions,
    ) -> CartResult<()> {
        match self.position(item) {
            Some(index) => {
                let diff = quantity
                    .checked_sub(self.items()[index].quantity())
                    .ok_or_else(|| CartError::QuantityOverflow(format!("{:?}", item.id())))?;
                if diff < 0 {
                    let units = diff
                        .checked_neg()
                        .ok_or_else(|| CartError::QuantityOverflow(format!("{:?}", item.id())))?;
                    self.remove_from_cart(item, RemoveQuantity::Units(units), options)
                } else {
                    self.add_to_cart(item, diff, options)
                }
            }
            None => self.add_to_cart(item, quantity, options),
        }
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    /// Store veto point before an add.
    fn before_add_to_cart(&mut self, item: &Self::Item, quantity: i64, options: &HookOptions) -> bool {
        let _ = (item, quantity, options);
        true
    }

    /// Store notification after an add.
    fn after_add_to_cart(&mut self, item: &Self::Item, quantity: i64, options: &HookOptions) {
        let _ = (item, quantity, options);
    }

    /// Store veto point before a remove.
    fn before_remove_from_cart(
        &mut self,
        item: &Self::Item,
        quantity: RemoveQuantity,
        options: &HookOptions,
    ) -> bool {
        let _ = (item, quantity, options);
        true
    }

    /// Store notification after a remove.
    fn after_remove_from_cart(
        &mut self,
        item: &Self::Item,
        quantity: RemoveQuantity,
        options: &HookOptions,
    ) {
        let _ = (item, quantity, options);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
