//! # Error Types
//!
//! Domain-specific error types for cartwright-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cartwright-core errors (this file)                                     │
//! │  └── CartError        - Lifecycle, store and pipeline failures          │
//! │                                                                         │
//! │  cartwright-config errors (separate crate)                              │
//! │  └── ConfigError      - Loading / validating configuration              │
//! │                                                                         │
//! │  NOT an error: CartOutcome::Cancelled                                   │
//! │  A before-hook saying "no" is an expected outcome, returned as a value. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (event, state, index)
//! 3. Errors are enum variants, never String
//! 4. No retries: every operation is deterministic

use thiserror::Error;

use crate::lifecycle::{CartEvent, CartState};

// =============================================================================
// Cart Error
// =============================================================================

/// Errors raised by the cart engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A capability the concrete type was expected to provide is missing.
    ///
    /// ## When This Occurs
    /// - `CartStore::invoice_id` was not overridden by the storage collaborator
    #[error("{0} is not implemented by this type")]
    NotImplemented(&'static str),

    /// A lifecycle event was fired from a state outside its `From` set.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart state: completed
    ///      │
    ///      ▼
    /// continue_shopping()
    ///      │
    ///      ▼
    /// InvalidTransition { event: continue_shopping, from: completed }
    /// ```
    #[error("Cannot fire {event} from state {from}")]
    InvalidTransition { event: CartEvent, from: CartState },

    /// An event name that the store does not declare.
    #[error("Unknown lifecycle event: {0}")]
    UnknownEvent(String),

    /// A state name that is not one of the five lifecycle states.
    ///
    /// ## When This Occurs
    /// - A storage collaborator rehydrates a cart from a corrupt state column
    #[error("Unknown cart state: {0}")]
    UnknownState(String),

    /// A raw append of an item whose identity is already in the cart.
    #[error("Item {0} is already in the cart")]
    DuplicateItem(String),

    /// A line quantity would leave the `i64` range.
    ///
    /// ## When This Occurs
    /// - `add_to_cart` merges into a line already near `i64::MAX`
    /// - `update_cart` or `remove_from_cart` with a quantity near `i64::MIN`
    #[error("Quantity for item {0} is out of range")]
    QuantityOverflow(String),

    /// Positional operation outside the collection bounds.
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Failure reported by a storage collaborator.
    #[error("Storage error: {0}")]
    Storage(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
