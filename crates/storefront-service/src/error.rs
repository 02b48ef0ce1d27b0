//! # Service Error Type
//!
//! The one error type every service operation returns.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Transport                   Service                                    │
//! │  ─────────                   ───────                                    │
//! │                                                                         │
//! │  POST /orders                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  OrderService::create                                            │  │
//! │  │  Result<Order, ServiceError>                                     │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation? ─── ValidationError ──────────┐                    │  │
//! │  │         │                                  │                    │  │
//! │  │         ▼                                  ▼                    │  │
//! │  │  Business rule? ─── CoreError ───────► ServiceError ──────────►│  │
//! │  │         │                                  ▲                    │  │
//! │  │         ▼                                  │                    │  │
//! │  │  Store failure? ─── DbError ───────────────┘                    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "CONFLICT", "message": "Insufficient stock ..." }  → 409     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `INTERNAL` errors carry the raw store message, and they are logged
//! at `error!` when classified.

use serde::Serialize;
use std::fmt;
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;
use thiserror::Error;
use tracing::{error, warn};

/// Error returned from every service operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 3f0c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct ServiceError {
    /// Machine-readable classification
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,
}

/// Caller-facing error classification.
///
/// ## Usage in a Transport
/// ```rust,ignore
/// let status = StatusCode::from_u16(err.code.http_status())?;
/// (status, Json(err))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or out-of-range input, unknown status (400)
    ValidationError,

    /// Referenced entity absent (404)
    NotFound,

    /// Authenticated but not permitted (403)
    Forbidden,

    /// Insufficient stock, duplicate 1:1 link, referential block (409)
    Conflict,

    /// Unexpected store failure (500)
    Internal,
}

impl ErrorCode {
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::Forbidden => 403,
            ErrorCode::Conflict => 409,
            ErrorCode::Internal => 500,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error's code.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// The `{ "code", "message" }` body a transport sends alongside
    /// [`Self::http_status`].
    pub fn to_response_body(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                warn!(field = %field, "Unique constraint rejected write");
                ServiceError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                // inserts map dangling references to NotFound, so what is
                // left here is a RESTRICT key refusing a delete
                warn!(message = %message, "Foreign key rejected write");
                ServiceError::conflict("Record is still referenced by other records")
            }
            DbError::CheckViolation { message } => {
                warn!(message = %message, "Check constraint rejected write");
                ServiceError::validation("Value violates a storage constraint")
            }
            other => {
                error!(error = %other, "Database operation failed");
                ServiceError::internal(other.to_string())
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } => ServiceError::conflict(err.to_string()),
            CoreError::NotFound { entity, id } => ServiceError::not_found(entity, &id),
            CoreError::Forbidden(reason) => ServiceError::forbidden(reason),
            CoreError::Conflict(reason) => ServiceError::conflict(reason),
            CoreError::Validation(e) => ServiceError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
