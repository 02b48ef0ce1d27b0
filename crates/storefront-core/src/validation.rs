//! # Validation Module
//!
//! Input validation utilities for the storefront core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (outside this workspace)                           │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: storefront-service, before any unit of work opens            │
//! │  └── THIS MODULE: field rules (quantity > 0, rating 0..=5, ...)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price_cents > 0)                       │
//! │  ├── UNIQUE (payments.order_id), UNIQUE (cart user+offer)              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_quantity, validate_rating};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! assert!(validate_rating(6).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_RATING;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-form text accepted for names, methods and address parts.
pub const MAX_TEXT_LEN: usize = 255;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-form text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_TEXT_LEN`] characters
///
/// ## Returns
/// The trimmed value, ready to persist.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_required_text;
///
/// assert_eq!(validate_required_text("method", " card ").unwrap(), "card");
/// assert!(validate_required_text("method", "   ").is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a payment method label ("card", "paypal", ...).
///
/// The method is free-form; it only has to be present.
pub fn validate_payment_method(method: &str) -> ValidationResult<String> {
    validate_required_text("method", method)
}

/// Validates an identifier passed by the caller.
///
/// Only presence is checked; an id that names nothing surfaces later as
/// not-found.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order or cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## User Workflow
/// ```text
/// create_order(offer, quantity: 0)
///       │
///       ▼
/// validate_quantity(0) ← THIS FUNCTION
///       │
///       └── Error: "quantity must be positive"
///           (no transaction was opened, stock untouched)
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an offer price in cents.
///
/// ## Rules
/// - Must be positive (> 0). Free offers are not supported.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an absolute stock level set by an administrator.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a manufacturer or product rating.
///
/// ## Rules
/// - Between 0 and [`MAX_RATING`] inclusive
pub fn validate_rating(rating: i64) -> ValidationResult<()> {
    if !(0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: MAX_RATING,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
