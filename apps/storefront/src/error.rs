//! # API Error Type
//!
//! Unified error type for storefront operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  storefront.add_to_cart(owner, "p1", 2)                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<CartResponse, ApiError>                                  │  │
//! │  │         │                                                        │  │
//! │  │  Database Error? ─── DbError::Conflict ───────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │  Pricing Error? ──── CoreError::InvalidQuantity ── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Display layer receives:                                               │
//! │    { "code": "INVALID_QUANTITY", "message": "Invalid quantity -1 ..." } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged with `tracing::error!` and replaced by a
//! generic message; raw SQL errors never reach the display layer.

use serde::Serialize;
use storefront_core::CoreError;
use storefront_db::DbError;
use ts_rs::TS;

use crate::config::ConfigError;

/// Error returned from storefront operations.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: p-123"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// A line carries a negative or non-integer quantity (400)
    InvalidQuantity,

    /// A price can't be represented in two decimals (400)
    InvalidMoneyAmount,

    /// Not enough stock for the requested quantity (409)
    InsufficientStock,

    /// Cart rule violated (too many lines, item missing) (422)
    CartError,

    /// Checkout attempted on an empty cart (422)
    CartEmpty,

    /// Cart changed concurrently; reload and retry (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Conflict { .. } => ApiError::new(
                ErrorCode::Conflict,
                "The cart was changed by another request. Reload and try again.",
            ),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::Domain(e) => {
                tracing::error!("Stored data rejected: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is invalid")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::validation("Invalid value")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidQuantity { .. } | CoreError::QuantityTooLarge { .. } => {
                ErrorCode::InvalidQuantity
            }
            CoreError::InvalidMoneyAmount { .. } => ErrorCode::InvalidMoneyAmount,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::ItemNotInCart(_) | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::CartEmpty => ErrorCode::CartEmpty,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        ApiError::new(code, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
