//! # Order Lifecycle Rules
//!
//! Decides what a requested status change means, without touching storage.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller  │ Requested   │ Current              │ Outcome                 │
//! │  ────────┼─────────────┼──────────────────────┼──────────────────────── │
//! │  admin   │ any         │ any                  │ Apply (no stock effect) │
//! │  owner   │ Cancelled   │ Pending, Processing  │ CancelAndRelease        │
//! │  owner   │ Cancelled   │ Shipped, Delivered,  │ Forbidden               │
//! │          │             │ Cancelled            │                         │
//! │  owner   │ other       │ any                  │ Forbidden               │
//! │  other   │ any         │ any                  │ Forbidden               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service layer calls [`decide_transition`] after claiming the order
//! row, then either writes the new status or writes `Cancelled` and hands
//! `order.quantity` back to the inventory ledger, all in one transaction.

use crate::access::{require, Caller, Scope};
use crate::error::CoreError;
use crate::types::OrderStatus;

/// What the persistence layer must do for an accepted status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write the requested status. Nothing else changes.
    Apply(OrderStatus),
    /// Write `Cancelled` and release the order's quantity back to its offer.
    CancelAndRelease,
}

impl Transition {
    /// The status the order ends up with.
    pub fn target(&self) -> OrderStatus {
        match self {
            Transition::Apply(status) => *status,
            Transition::CancelAndRelease => OrderStatus::Cancelled,
        }
    }

    pub fn releases_stock(&self) -> bool {
        matches!(self, Transition::CancelAndRelease)
    }
}

/// Decides whether `caller` may move an order owned by `owner_id` from
/// `current` to `requested`.
///
/// ## Errors
/// [`CoreError::Forbidden`] for every combination a regular user is not
/// allowed, including cancelling an order that already left the
/// cancellable states.
pub fn decide_transition(
    caller: &Caller,
    owner_id: &str,
    current: OrderStatus,
    requested: OrderStatus,
) -> Result<Transition, CoreError> {
    if caller.is_admin() {
        return Ok(Transition::Apply(requested));
    }

    require(
        caller,
        Scope::Personal(owner_id),
        "You can only update your own orders",
    )?;

    if requested != OrderStatus::Cancelled {
        return Err(CoreError::forbidden(
            "Users can only change an order's status to Cancelled",
        ));
    }

    if !current.is_cancellable() {
        return Err(CoreError::forbidden(format!(
            "Order cannot be cancelled at this stage ({current})"
        )));
    }

    Ok(Transition::CancelAndRelease)
}

// =============================================================================
// Unit Tests
// =============================================================================
