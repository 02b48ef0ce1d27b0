//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate is the **heart** of the storefront order-and-inventory core.
//! It contains the business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Core Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Transport + Authentication (outside)                 │   │
//! │  │       Caller { user_id, role } arrives already validated        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-service (units of work)              │   │
//! │  │     create_order, set_order_status, add_to_cart, ...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ │   │
//! │  │  │  types  │ │  money  │ │ access  │ │lifecycle │ │validation│ │   │
//! │  │  │  Order  │ │  Money  │ │ Caller  │ │  status  │ │  rules   │ │   │
//! │  │  │  Offer  │ │         │ │ Access  │ │  rules   │ │  checks  │ │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └──────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  storefront-db (Database Layer)                 │   │
//! │  │         SQLite queries, migrations, inventory ledger            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Offer, Payment, ShippingRecord, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`access`] - Caller identity and the access-control decision function
//! - [`lifecycle`] - Order status transition rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::access::Caller;
//! use storefront_core::lifecycle::{decide_transition, Transition};
//! use storefront_core::OrderStatus;
//!
//! let caller = Caller::user("user-1");
//!
//! // A user may cancel their own pending order; the stock comes back.
//! let transition = decide_transition(
//!     &caller,
//!     "user-1",
//!     OrderStatus::Pending,
//!     OrderStatus::Cancelled,
//! )
//! .unwrap();
//! assert_eq!(transition, Transition::CancelAndRelease);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use storefront_core::Money` instead of
// `use storefront_core::money::Money`

pub use access::{Access, Caller, Role};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity used when a cart add does not say how many.
pub const DEFAULT_CART_QUANTITY: i64 = 1;

/// Status given to a shipping record created without one.
pub const DEFAULT_SHIPPING_STATUS: &str = "Pending";

/// Highest rating a manufacturer or product can carry.
pub const MAX_RATING: i64 = 5;

/// Generates a new entity identifier (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
