//! # Cart Items
//!
//! The [`Item`] contract for anything that can sit in a cart.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two items are the SAME CART LINE iff their ids are equal.              │
//! │                                                                         │
//! │  Item { id: 1, name: "Tea",  price: $2.00 }  ─┐                         │
//! │                                               ├─► one line, qty summed  │
//! │  Item { id: 1, name: "Tea!", price: $9.00 }  ─┘                         │
//! │                                                                         │
//! │  Name and price never take part in identity.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Callback Hooks
//! Items can veto their own addition/removal through `before_*` hooks and
//! observe it through `after_*` hooks. All hooks default to permissive
//! no-ops, so a plain item only implements identity, name, price and quantity.

use std::fmt;

use crate::money::Money;

/// Free-form options passed through unchanged to every callback.
pub type HookOptions = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Remove Quantity
// =============================================================================

/// How much of a cart line to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveQuantity {
    /// Remove this many units; the line is deleted if nothing would remain.
    Units(i64),
    /// Remove the whole line regardless of its quantity.
    All,
}

impl RemoveQuantity {
    /// Resolves to a unit count against the line's current quantity.
    #[inline]
    pub fn resolve(&self, current: i64) -> i64 {
        match self {
            RemoveQuantity::Units(units) => *units,
            RemoveQuantity::All => current,
        }
    }
}

impl Default for RemoveQuantity {
    fn default() -> Self {
        RemoveQuantity::Units(1)
    }
}

impl From<i64> for RemoveQuantity {
    fn from(units: i64) -> Self {
        RemoveQuantity::Units(units)
    }
}

impl fmt::Display for RemoveQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveQuantity::Units(units) => write!(f, "{units}"),
            RemoveQuantity::All => f.write_str("all"),
        }
    }
}

// =============================================================================
// Item Contract
// =============================================================================

/// Anything placeable in a cart.
pub trait Item {
    /// Opaque identity key.
    type Id: PartialEq + Clone + fmt::Debug;

    /// Identity of the cart line this item belongs to.
    fn id(&self) -> &Self::Id;

    /// Display name.
    fn name(&self) -> &str;

    /// Unit price.
    fn price(&self) -> Money;

    /// Quantity of this item in the context of a cart.
    fn quantity(&self) -> i64;

    /// Sets the quantity. Only stores should call this.
    fn set_quantity(&mut self, quantity: i64);

    /// True when both items are the same cart line.
    fn same_line(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Line total (`quantity × price`).
    fn line_total(&self) -> Money {
        self.price() * self.quantity()
    }

    /// Veto point before the item is added. Returning false cancels the add.
    fn before_add_to_cart(&self, quantity: i64, options: &HookOptions) -> bool {
        let _ = (quantity, options);
        true
    }

    /// Notified after the item was added.
    fn after_add_to_cart(&self, quantity: i64, options: &HookOptions) {
        let _ = (quantity, options);
    }

    /// Veto point before the item is removed. Returning false cancels the remove.
    fn before_remove_from_cart(&self, quantity: RemoveQuantity, options: &HookOptions) -> bool {
        let _ = (quantity, options);
        true
    }

    /// Notified after the item was removed.
    fn after_remove_from_cart(&self, quantity: RemoveQuantity, options: &HookOptions) {
        let _ = (quantity, options);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Sticker {
        id: &'static str,
        price_cents: i64,
        quantity: i64,
    }

    impl Item for Sticker {
        type Id = &'static str;

        fn id(&self) -> &Self::Id {
            &self.id
        }

        fn name(&self) -> &str {
            "Sticker"
        }

        fn price(&self) -> Money {
            Money::from_cents(self.price_cents)
        }

        fn quantity(&self) -> i64 {
            self.quantity
        }

        fn set_quantity(&mut self, quantity: i64) {
            self.quantity = quantity;
        }
    }

    #[test]
    fn test_identity_ignores_price() {
        let a = Sticker { id: "cat", price_cents: 100, quantity: 0 };
        let b = Sticker { id: "cat", price_cents: 900, quantity: 3 };
        let c = Sticker { id: "dog", price_cents: 100, quantity: 0 };

        assert!(a.same_line(&b));
        assert!(!a.same_line(&c));
    }

    #[test]
    fn test_default_hooks_are_permissive() {
        let item = Sticker { id: "cat", price_cents: 100, quantity: 0 };
        let options = HookOptions::new();
        assert!(item.before_add_to_cart(1, &options));
        assert!(item.before_remove_from_cart(RemoveQuantity::All, &options));
    }

    #[test]
    fn test_line_total() {
        let item = Sticker { id: "cat", price_cents: 250, quantity: 4 };
        assert_eq!(item.line_total().cents(), 1000);
    }

    #[test]
    fn test_remove_quantity_resolution() {
        assert_eq!(RemoveQuantity::All.resolve(7), 7);
        assert_eq!(RemoveQuantity::from(3).resolve(7), 3);
        assert_eq!(RemoveQuantity::default(), RemoveQuantity::Units(1));
        assert_eq!(RemoveQuantity::All.to_string(), "all");
    }
}
