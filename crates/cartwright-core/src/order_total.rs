//! # Order Totals
//!
//! Pluggable calculators that adjust the cart total (shipping, tax,
//! vouchers...), kept in an ordered [`OrderTotalCollection`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderTotalCollection (order = invoice line order)                      │
//! │                                                                         │
//! │   [0] Shipping   active   ──► price(cart) = +$5.00  ─┐                  │
//! │   [1] Voucher    inactive ──► (not invoked)  $0.00   ├─► Σ = +$3.00     │
//! │   [2] Loyalty    active   ──► price(cart) = -$2.00  ─┘                  │
//! │                                                                         │
//! │  Cart::total = CartStore::sub_total + Σ                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sum is order-independent; the order only matters for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use tracing::debug;
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::store::CartStore;

// =============================================================================
// Order Total Contract
// =============================================================================

/// A calculator contributing an adjustment to the cart total.
///
/// Inactive calculators contribute nothing and are not asked for a price by
/// the collection, though callers may still call [`OrderTotal::price`].
pub trait OrderTotal<S: CartStore> {
    /// Whether this calculator applies to the cart.
    fn is_active(&self) -> bool;

    /// Turns the calculator on or off.
    fn set_active(&mut self, active: bool);

    /// The adjustment for `cart`. May be negative.
    fn price(&self, cart: &Cart<S>) -> Money;

    /// Friendly name for invoices.
    fn name(&self) -> &str;

    /// Short description for invoices.
    fn description(&self) -> &str;
}

/// Owned calculator trait object.
pub type BoxedOrderTotal<S> = Box<dyn OrderTotal<S>>;

/// One rendered invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotalLine {
    pub name: String,
    pub description: String,
    pub price: Money,
}

// =============================================================================
// Collection
// =============================================================================

/// Ordered, mutable list of calculators owned by one cart.
pub struct OrderTotalCollection<S: CartStore> {
    calculators: Vec<BoxedOrderTotal<S>>,
}

impl<S: CartStore> OrderTotalCollection<S> {
    /// An empty collection.
    pub fn new() -> Self {
        OrderTotalCollection {
            calculators: Vec::new(),
        }
    }

    /// Σ `price(cart)` over active calculators.
    pub fn total(&self, cart: &Cart<S>) -> Money {
        self.calculators
            .iter()
            .filter(|calculator| calculator.is_active())
            .map(|calculator| calculator.price(cart))
            .sum()
    }

    /// Active calculators rendered as invoice lines, in order.
    pub fn lines(&self, cart: &Cart<S>) -> Vec<OrderTotalLine> {
        self.calculators
            .iter()
            .filter(|calculator| calculator.is_active())
            .map(|calculator| OrderTotalLine {
                name: calculator.name().to_string(),
                description: calculator.description().to_string(),
                price: calculator.price(cart),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn OrderTotal<S>> {
        self.calculators.get(index).map(|calculator| calculator.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut BoxedOrderTotal<S>> {
        self.calculators.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoxedOrderTotal<S>> {
        self.calculators.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, BoxedOrderTotal<S>> {
        self.calculators.iter_mut()
    }

    /// Names in pipeline order.
    pub fn names(&self) -> Vec<&str> {
        self.calculators.iter().map(|calculator| calculator.name()).collect()
    }

    /// Appends one calculator.
    pub fn push(&mut self, calculator: impl OrderTotal<S> + 'static) {
        debug!(name = calculator.name(), "Appended order total");
        self.calculators.push(Box::new(calculator));
    }

    /// Removes and returns the calculator at `index`.
    pub fn remove(&mut self, index: usize) -> CartResult<BoxedOrderTotal<S>> {
        self.check_index(index, self.len())?;
        Ok(self.calculators.remove(index))
    }

    /// Inserts `calculators`, in order, before the current occupant of
    /// `index`. `index == len()` appends.
    ///
    /// ```text
    /// [0,1,2,3,4].insert_before(3, [x, y])  ──►  [0,1,2,x,y,3,4]
    /// ```
    pub fn insert_before<I>(&mut self, index: usize, calculators: I) -> CartResult<()>
    where
        I: IntoIterator<Item = BoxedOrderTotal<S>>,
    {
        self.check_index(index, self.len() + 1)?;
        let before = self.len();
        self.calculators.splice(index..index, calculators);
        debug!(index, inserted = self.len() - before, "Inserted order totals before");
        Ok(())
    }

    /// Inserts `calculators`, in order, right after `index`.
    ///
    /// ```text
    /// [0,1,2,3,4].insert_after(3, [x, y])  ──►  [0,1,2,3,x,y,4]
    /// ```
    pub fn insert_after<I>(&mut self, index: usize, calculators: I) -> CartResult<()>
    where
        I: IntoIterator<Item = BoxedOrderTotal<S>>,
    {
        self.check_index(index, self.len())?;
        let before = self.len();
        self.calculators.splice(index + 1..index + 1, calculators);
        debug!(index, inserted = self.len() - before, "Inserted order totals after");
        Ok(())
    }

    /// Relocates the calculator at `from` to `to`, shifting the others.
    /// This is a move, not a swap.
    ///
    /// ```text
    /// [0,1,2,3,4].move_to(3, 0)  ──►  [3,0,1,2,4]
    /// ```
    pub fn move_to(&mut self, from: usize, to: usize) -> CartResult<()> {
        self.check_index(from, self.len())?;
        self.check_index(to, self.len())?;
        let calculator = self.calculators.remove(from);
        self.calculators.insert(to, calculator);
        debug!(from, to, "Moved order total");
        Ok(())
    }

    fn check_index(&self, index: usize, bound: usize) -> CartResult<()> {
        if index < bound {
            Ok(())
        } else {
            Err(CartError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
}

impl<S: CartStore> Default for OrderTotalCollection<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CartStore> fmt::Debug for OrderTotalCollection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.calculators
                    .iter()
                    .map(|calculator| (calculator.name(), calculator.is_active())),
            )
            .finish()
    }
}

/// Concatenation: left entries, then right entries.
impl<S: CartStore> Add for OrderTotalCollection<S> {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self.calculators.extend(other.calculators);
        self
    }
}

/// Concatenation with a plain list of calculators.
impl<S: CartStore> Add<Vec<BoxedOrderTotal<S>>> for OrderTotalCollection<S> {
    type Output = Self;

    fn add(mut self, other: Vec<BoxedOrderTotal<S>>) -> Self {
        self.calculators.extend(other);
        self
    }
}

impl<S: CartStore> AddAssign for OrderTotalCollection<S> {
    fn add_assign(&mut self, other: Self) {
        self.calculators.extend(other.calculators);
    }
}

impl<S: CartStore> AddAssign<Vec<BoxedOrderTotal<S>>> for OrderTotalCollection<S> {
    fn add_assign(&mut self, other: Vec<BoxedOrderTotal<S>>) {
        self.calculators.extend(other);
    }
}

impl<S: CartStore> Extend<BoxedOrderTotal<S>> for OrderTotalCollection<S> {
    fn extend<T: IntoIterator<Item = BoxedOrderTotal<S>>>(&mut self, iter: T) {
        self.calculators.extend(iter);
    }
}

impl<S: CartStore> FromIterator<BoxedOrderTotal<S>> for OrderTotalCollection<S> {
    fn from_iter<T: IntoIterator<Item = BoxedOrderTotal<S>>>(iter: T) -> Self {
        OrderTotalCollection {
            calculators: iter.into_iter().collect(),
        }
    }
}

impl<S: CartStore> IntoIterator for OrderTotalCollection<S> {
    type Item = BoxedOrderTotal<S>;
    type IntoIter = std::vec::IntoIter<BoxedOrderTotal<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.calculators.into_iter()
    }
}

impl<'a, S: CartStore> IntoIterator for &'a OrderTotalCollection<S> {
    type Item = &'a BoxedOrderTotal<S>;
    type IntoIter = std::slice::Iter<'a, BoxedOrderTotal<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.calculators.iter()
    }
}

// =============================================================================
// Built-in Calculators
// =============================================================================

/// A fixed adjustment: a positive fee or a negative discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatAdjustment {
    name: String,
    description: String,
    amount: Money,
    active: bool,
}

impl FlatAdjustment {
    /// Creates an inactive flat adjustment.
    pub fn new(name: impl Into<String>, description: impl Into<String>, amount: Money) -> Self {
        FlatAdjustment {
            name: name.into(),
            description: description.into(),
            amount,
            active: false,
        }
    }

    /// Same calculator, switched on.
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

impl<S: CartStore> OrderTotal<S> for FlatAdjustment {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn price(&self, _cart: &Cart<S>) -> Money {
        self.amount
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Basis points of the cart sub-total (1000 bps = 10%).
///
/// Negative rates express percentage discounts. The half-cent rounds away
/// from zero; see [`Money::basis_points`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentageAdjustment {
    name: String,
    description: String,
    bps: i64,
    active: bool,
}

impl PercentageAdjustment {
    /// Creates an inactive percentage adjustment.
    pub fn new(name: impl Into<String>, description: impl Into<String>, bps: i64) -> Self {
        PercentageAdjustment {
            name: name.into(),
            description: description.into(),
            bps,
            active: false,
        }
    }

    /// Same calculator, switched on.
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn bps(&self) -> i64 {
        self.bps
    }
}

impl<S: CartStore> OrderTotal<S> for PercentageAdjustment {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn price(&self, cart: &Cart<S>) -> Money {
        cart.sub_total().basis_points(self.bps)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::HookOptions;
    use crate::memory::{MemoryItem, MemoryStore};
    use std::cell::Cell;
    use std::rc::Rc;

    type Store = MemoryStore<MemoryItem>;

    /// Fixed-price calculator that counts how often it is priced.
    struct Fixed {
        label: &'static str,
        cents: i64,
        active: bool,
        priced: Rc<Cell<u32>>,
    }

    fn fixed(label: &'static str, cents: i64, active: bool) -> BoxedOrderTotal<Store> {
        Box::new(Fixed {
            label,
            cents,
            active,
            priced: Rc::new(Cell::new(0)),
        })
    }

    impl OrderTotal<Store> for Fixed {
        fn is_active(&self) -> bool {
            self.active
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
        }

        fn price(&self, _cart: &Cart<Store>) -> Money {
            self.priced.set(self.priced.get() + 1);
            Money::from_cents(self.cents)
        }

        fn name(&self) -> &str {
            self.label
        }

        fn description(&self) -> &str {
            "fixed"
        }
    }

    fn numbered() -> OrderTotalCollection<Store> {
        ["0", "1", "2", "3", "4"]
            .into_iter()
            .map(|label| fixed(label, 0, true))
            .collect()
    }

    #[test]
    fn test_insert_before() {
        let mut collection = numbered();
        collection.insert_before(3, vec![fixed("5", 0, true)]).unwrap();
        assert_eq!(collection.names(), vec!["0", "1", "2", "5", "3", "4"]);
    }

    #[test]
    fn test_insert_before_keeps_relative_order() {
        let mut collection = numbered();
        let extra = ["5", "6", "7", "8"].map(|label| fixed(label, 0, true));
        collection.insert_before(3, extra).unwrap();
        assert_eq!(
            collection.names(),
            vec!["0", "1", "2", "5", "6", "7", "8", "3", "4"]
        );
    }

    #[test]
    fn test_insert_after() {
        let mut collection = numbered();
        collection.insert_after(3, vec![fixed("5", 0, true)]).unwrap();
        assert_eq!(collection.names(), vec!["0", "1", "2", "3", "5", "4"]);

        let mut collection = numbered();
        let extra = ["5", "6", "7", "8"].map(|label| fixed(label, 0, true));
        collection.insert_after(3, extra).unwrap();
        assert_eq!(
            collection.names(),
            vec!["0", "1", "2", "3", "5", "6", "7", "8", "4"]
        );
    }

    #[test]
    fn test_move_is_a_relocation() {
        let mut collection = numbered();
        collection.move_to(3, 0).unwrap();
        assert_eq!(collection.names(), vec!["3", "0", "1", "2", "4"]);

        collection.move_to(0, 4).unwrap();
        assert_eq!(collection.names(), vec!["0", "1", "2", "4", "3"]);
    }

    #[test]
    fn test_out_of_range_leaves_collection_unchanged() {
        let mut collection = numbered();

        assert_eq!(
            collection.insert_before(6, vec![fixed("x", 0, true)]),
            Err(CartError::IndexOutOfRange { index: 6, len: 5 })
        );
        assert!(collection.insert_after(5, vec![fixed("x", 0, true)]).is_err());
        assert!(collection.move_to(5, 0).is_err());
        assert!(collection.move_to(0, 5).is_err());
        assert!(collection.remove(9).is_err());
        assert_eq!(collection.names(), vec!["0", "1", "2", "3", "4"]);

        // appending through insert_before(len) is allowed
        collection.insert_before(5, vec![fixed("5", 0, true)]).unwrap();
        assert_eq!(collection.len(), 6);
    }

    #[test]
    fn test_total_sums_active_only() {
        let cart = Cart::new(Store::new());
        let priced = Rc::new(Cell::new(0));
        let inactive: BoxedOrderTotal<Store> = Box::new(Fixed {
            label: "off",
            cents: 5,
            active: false,
            priced: Rc::clone(&priced),
        });

        let collection = OrderTotalCollection::new()
            + vec![fixed("a", 10, true), inactive, fixed("c", 2, true), fixed("d", 14, true)];

        assert_eq!(collection.total(&cart), Money::from_cents(26));
        assert_eq!(priced.get(), 0, "inactive calculators are never priced");
    }

    #[test]
    fn test_concatenation_keeps_order() {
        let left: OrderTotalCollection<Store> =
            vec![fixed("a", 1, true), fixed("b", 2, true)].into_iter().collect();
        let right: OrderTotalCollection<Store> = vec![fixed("c", 3, true)].into_iter().collect();

        let mut joined = left + right;
        assert_eq!(joined.names(), vec!["a", "b", "c"]);

        joined += vec![fixed("d", 4, true)];
        assert_eq!(joined.names(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_toggling_active_keeps_position() {
        let cart = Cart::new(Store::new());
        let mut collection: OrderTotalCollection<Store> =
            vec![fixed("a", 10, true), fixed("b", 20, true)].into_iter().collect();
        assert_eq!(collection.total(&cart).cents(), 30);

        if let Some(calculator) = collection.get_mut(0) {
            calculator.set_active(false);
        }
        assert_eq!(collection.total(&cart).cents(), 20);
        assert_eq!(collection.names(), vec!["a", "b"]);
        assert_eq!(collection.lines(&cart).len(), 1);
    }

    #[test]
    fn test_builtin_calculators() {
        let mut cart = Cart::new(Store::new());
        let tea = MemoryItem::new(1, "Tea", Money::from_cents(1000));
        cart.add_to_cart_with(&tea, 1, &HookOptions::new()).unwrap();

        let shipping = FlatAdjustment::new("Shipping", "Flat rate", Money::from_cents(500));
        let tax = PercentageAdjustment::new("GST", "10%", 1000).activated();

        assert!(!OrderTotal::<Store>::is_active(&shipping));
        assert_eq!(OrderTotal::<Store>::price(&tax, &cart).cents(), 100);

        cart.order_totals_mut().push(shipping.activated());
        cart.order_totals_mut().push(tax);
        assert_eq!(cart.adjustment().cents(), 600);
        assert_eq!(cart.total().cents(), 1600);
    }
}
