//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule outcomes                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  storefront-service errors                                             │
//! │  └── ServiceError     - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError ← DbError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, ID, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to exactly one caller-facing error code

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule outcomes.
///
/// Every variant corresponds to one caller-facing classification, which the
/// service layer maps mechanically (Validation → 400, NotFound → 404,
/// Forbidden → 403, InsufficientStock/Conflict → 409).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock on an offer to satisfy a request.
    ///
    /// ## When This Occurs
    /// - Creating an order for more units than the offer holds
    /// - Adding to the cart beyond what the offer holds
    ///
    /// ## User Workflow
    /// ```text
    /// Create order (qty: 5)
    ///      │
    ///      ▼
    /// Conditional reserve: stock=3, no row updated
    ///      │
    ///      ▼
    /// InsufficientStock { offer_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Caller sees 409 "Insufficient stock"
    /// ```
    #[error("Insufficient stock for offer {offer_id}: available {available}, requested {requested}")]
    InsufficientStock {
        offer_id: String,
        available: i64,
        requested: i64,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller is authenticated but not permitted to do this.
    ///
    /// ## When This Occurs
    /// - A user touching another user's order, payment, shipping or address
    /// - A user calling an admin-only operation
    /// - A user requesting any status other than Cancelled, or cancelling an
    ///   order that is already Shipped, Delivered or Cancelled
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request collides with existing state.
    ///
    /// ## When This Occurs
    /// - A second payment or shipping record for one order
    /// - Deleting an address, offer or manufacturer that is still referenced
    /// - Cart quantity beyond available stock
    #[error("{0}")]
    Conflict(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for [`CoreError::Forbidden`].
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden(reason.into())
    }

    /// Shorthand for [`CoreError::Conflict`].
    pub fn conflict(reason: impl Into<String>) -> Self {
        CoreError::Conflict(reason.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Validation always runs before a unit of work is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set (e.g. an unknown order status).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// An update carried no fields at all.
    #[error("No fields to update")]
    NoFieldsToUpdate,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            offer_id: "offer-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for offer offer-1: available 3, requested 5"
        );

        let err = CoreError::not_found("Order", "abc");
        assert_eq!(err.to_string(), "Order not found: abc");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "method".to_string(),
        };
        assert_eq!(err.to_string(), "method is required");

        let err = ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: 5,
        };
        assert_eq!(err.to_string(), "rating must be between 0 and 5");
        assert_eq!(
            ValidationError::NoFieldsToUpdate.to_string(),
            "No fields to update"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
