//! # Cart Lifecycle
//!
//! The checkout state machine every cart store carries.
//!
//! ## State Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐   checkout    ┌──────────┐  check_payment  ┌──────────┐ │
//! │   │ shopping │ ────────────► │ checkout │ ──────────────► │verifying_│ │
//! │   │ (initial)│ ◄──────────── │          │ ◄────────────── │ payment  │ │
//! │   └──────────┘  continue_    └──────────┘    checkout     └────┬─────┘ │
//! │        ▲        shopping          ▲                            │       │
//! │        └──────────────────────────┼───── continue_shopping ────┤       │
//! │                                                                │       │
//! │                          payment_successful    payment_failed  │       │
//! │                      ┌─────────────┐ ◄─────────┴──────► ┌──────────┐  │
//! │                      │  completed  │                    │  failed  │  │
//! │                      │ (terminal)  │                    │(terminal)│  │
//! │                      └─────────────┘                    └──────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Firing an Event
//! Driven by `CartStore::fire`, using the store's own hooks:
//! 1. Event not in the store's declared events → [`CartError::UnknownEvent`]
//! 2. Current state outside the event's `From` set → [`CartError::InvalidTransition`]
//! 3. Guard returns false → `Ok(false)`, nothing else happens
//! 4. Otherwise: exit hook, state change, enter hook → `Ok(true)`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use ts_rs::TS;

use crate::error::{CartError, CartResult};

// =============================================================================
// Cart State
// =============================================================================

/// The lifecycle state of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    /// Items are being added and removed.
    #[default]
    Shopping,
    /// The customer is reviewing the order.
    Checkout,
    /// Waiting for the payment provider.
    VerifyingPayment,
    /// Paid. Terminal.
    Completed,
    /// Payment was declined. Terminal.
    Failed,
}

impl CartState {
    /// Every state, in declaration order.
    pub const ALL: [CartState; 5] = [
        CartState::Shopping,
        CartState::Checkout,
        CartState::VerifyingPayment,
        CartState::Completed,
        CartState::Failed,
    ];

    /// The snake_case name used in logs and storage columns.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CartState::Shopping => "shopping",
            CartState::Checkout => "checkout",
            CartState::VerifyingPayment => "verifying_payment",
            CartState::Completed => "completed",
            CartState::Failed => "failed",
        }
    }

    /// Returns true when no event leaves this state.
    pub fn is_terminal(&self) -> bool {
        !CartEvent::ALL
            .iter()
            .any(|event| event.sources().contains(self))
    }
}

impl fmt::Display for CartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartState {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CartState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| CartError::UnknownState(s.to_string()))
    }
}

// =============================================================================
// Cart Event
// =============================================================================

/// A lifecycle transition that can be fired on a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartEvent {
    /// `checkout | verifying_payment -> shopping`
    ContinueShopping,
    /// `shopping | verifying_payment -> checkout`
    Checkout,
    /// `checkout -> verifying_payment`
    CheckPayment,
    /// `verifying_payment -> completed`
    PaymentSuccessful,
    /// `verifying_payment -> failed`
    PaymentFailed,
}

impl CartEvent {
    /// Every event, in declaration order.
    pub const ALL: [CartEvent; 5] = [
        CartEvent::ContinueShopping,
        CartEvent::Checkout,
        CartEvent::CheckPayment,
        CartEvent::PaymentSuccessful,
        CartEvent::PaymentFailed,
    ];

    /// The snake_case event name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CartEvent::ContinueShopping => "continue_shopping",
            CartEvent::Checkout => "checkout",
            CartEvent::CheckPayment => "check_payment",
            CartEvent::PaymentSuccessful => "payment_successful",
            CartEvent::PaymentFailed => "payment_failed",
        }
    }

    /// States this event may be fired from.
    pub const fn sources(&self) -> &'static [CartState] {
        match self {
            CartEvent::ContinueShopping => &[CartState::Checkout, CartState::VerifyingPayment],
            CartEvent::Checkout => &[CartState::Shopping, CartState::VerifyingPayment],
            CartEvent::CheckPayment => &[CartState::Checkout],
            CartEvent::PaymentSuccessful => &[CartState::VerifyingPayment],
            CartEvent::PaymentFailed => &[CartState::VerifyingPayment],
        }
    }

    /// State the cart lands in when the event succeeds.
    pub const fn target(&self) -> CartState {
        match self {
            CartEvent::ContinueShopping => CartState::Shopping,
            CartEvent::Checkout => CartState::Checkout,
            CartEvent::CheckPayment => CartState::VerifyingPayment,
            CartEvent::PaymentSuccessful => CartState::Completed,
            CartEvent::PaymentFailed => CartState::Failed,
        }
    }

    /// Resolves the target state when fired from `from`.
    pub fn transition_from(&self, from: CartState) -> CartResult<CartState> {
        if self.sources().contains(&from) {
            Ok(self.target())
        } else {
            warn!(event = %self, from = %from, "Rejected lifecycle event");
            Err(CartError::InvalidTransition { event: *self, from })
        }
    }
}

impl fmt::Display for CartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartEvent {
    type Err = CartError;

    /// Accepts the plain name and the bang form (`checkout!`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix('!').unwrap_or(s);
        CartEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == name)
            .ok_or_else(|| CartError::UnknownEvent(s.to_string()))
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Guard predicates and enter/exit hooks around lifecycle transitions.
///
/// Every method has a permissive default, so implementors override only the
/// points they care about.
///
/// ## Example
/// ```rust
/// use cartwright_core::lifecycle::{CartEvent, LifecycleHooks};
///
/// struct RequireAcceptedTerms {
///     accepted: bool,
/// }
///
/// impl LifecycleHooks for RequireAcceptedTerms {
///     fn guard(&self, event: CartEvent) -> bool {
///         event != CartEvent::CheckPayment || self.accepted
///     }
/// }
/// ```
pub trait LifecycleHooks {
    /// Gate for `event`. Returning false aborts the transition silently.
    fn guard(&self, event: CartEvent) -> bool {
        let _ = event;
        true
    }

    /// Runs just before the cart leaves `state`.
    fn on_exit(&mut self, state: CartState) {
        let _ = state;
    }

    /// Runs just after the cart enters `state`.
    fn on_enter(&mut self, state: CartState) {
        let _ = state;
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Holder of the current [`CartState`].
///
/// The state only changes through
/// [`CartStore::fire`](crate::store::CartStore::fire), which owns the guard
/// and exit/enter hook order. There is no public setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Lifecycle {
    state: CartState,
}

impl Lifecycle {
    /// A new lifecycle in the initial `shopping` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a lifecycle from a persisted state.
    ///
    /// Meant for storage collaborators loading an existing cart.
    pub fn resume(state: CartState) -> Self {
        Lifecycle { state }
    }

    /// Current state. Pure read.
    #[inline]
    pub fn state(&self) -> CartState {
        self.state
    }

    /// Moves to `to` without consulting anything. Crate-internal so stores
    /// can run their own hooks around it.
    pub(crate) fn advance(&mut self, to: CartState) {
        self.state = to;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_shopping() {
        assert_eq!(Lifecycle::new().state(), CartState::Shopping);
        assert_eq!(CartState::default(), CartState::Shopping);
    }

    #[test]
    fn test_full_transition_table() {
        let cases = [
            (CartState::Shopping, CartEvent::Checkout, Some(CartState::Checkout)),
            (CartState::VerifyingPayment, CartEvent::Checkout, Some(CartState::Checkout)),
            (CartState::Checkout, CartEvent::CheckPayment, Some(CartState::VerifyingPayment)),
            (CartState::VerifyingPayment, CartEvent::PaymentSuccessful, Some(CartState::Completed)),
            (CartState::VerifyingPayment, CartEvent::PaymentFailed, Some(CartState::Failed)),
            (CartState::Checkout, CartEvent::ContinueShopping, Some(CartState::Shopping)),
            (CartState::VerifyingPayment, CartEvent::ContinueShopping, Some(CartState::Shopping)),
            (CartState::Shopping, CartEvent::CheckPayment, None),
            (CartState::Shopping, CartEvent::ContinueShopping, None),
            (CartState::Checkout, CartEvent::Checkout, None),
            (CartState::Checkout, CartEvent::PaymentSuccessful, None),
            (CartState::Completed, CartEvent::ContinueShopping, None),
            (CartState::Completed, CartEvent::Checkout, None),
            (CartState::Failed, CartEvent::CheckPayment, None),
        ];

        for (from, event, expected) in cases {
            let result = event.transition_from(from);
            match expected {
                Some(to) => assert_eq!(result, Ok(to), "{event} from {from}"),
                None => assert_eq!(
                    result,
                    Err(CartError::InvalidTransition { event, from }),
                    "{event} from {from}"
                ),
            }
        }
    }

    #[test]
    fn test_resume_keeps_persisted_state() {
        assert_eq!(
            Lifecycle::resume(CartState::VerifyingPayment).state(),
            CartState::VerifyingPayment
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(CartState::Completed.is_terminal());
        assert!(CartState::Failed.is_terminal());
        assert!(!CartState::Shopping.is_terminal());
        assert!(!CartState::VerifyingPayment.is_terminal());
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for event in CartEvent::ALL {
            assert_eq!(event.as_str().parse::<CartEvent>(), Ok(event));
        }
        assert_eq!("checkout!".parse::<CartEvent>(), Ok(CartEvent::Checkout));
        assert!(matches!(
            "refund".parse::<CartEvent>(),
            Err(CartError::UnknownEvent(name)) if name == "refund"
        ));

        assert_eq!(
            "verifying_payment".parse::<CartState>(),
            Ok(CartState::VerifyingPayment)
        );
        assert!("pending".parse::<CartState>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&CartState::VerifyingPayment).unwrap();
        assert_eq!(json, "\"verifying_payment\"");
        let event: CartEvent = serde_json::from_str("\"payment_failed\"").unwrap();
        assert_eq!(event, CartEvent::PaymentFailed);
    }
}
