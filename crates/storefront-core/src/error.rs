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
//! │  ├── CoreError        - Cart and pricing rule violations               │
//! │  └── ValidationError  - Input field validation failures                │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  App errors (apps/storefront)                                          │
//! │  └── ApiError         - What the display layer sees (serialized)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Display      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//! The aggregator never retries and never partially recovers. A single bad
//! line rejects the whole computation; the caller fixes the data and calls
//! again.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and pricing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A line item has a non-positive or non-integer quantity.
    ///
    /// ## When This Occurs
    /// - A persisted or submitted line carries `quantity: -1`
    /// - A JSON payload carries `quantity: 1.5`
    ///
    /// The quantity is kept as text so non-integer input can be reported
    /// verbatim.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: String,
        quantity: String,
    },

    /// A price cannot be expressed as a non-negative amount with two decimal
    /// digits. Never rounded away silently.
    #[error("Invalid money amount '{value}': expected a non-negative amount with at most two decimal places")]
    InvalidMoneyAmount { value: String },

    /// Product is not present in the cart.
    #[error("Product {0} is not in the cart")]
    ItemNotInCart(String),

    /// Not enough stock to satisfy the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "p1", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Display: "Only 3 left in stock"
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was attempted on an empty cart.
    ///
    /// Computing totals on an empty cart is NOT an error (all totals are
    /// zero); only placing an order requires at least one line.
    #[error("Cannot check out an empty cart")]
    CartEmpty,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidQuantity error.
    pub fn invalid_quantity(product_id: impl Into<String>, quantity: impl ToString) -> Self {
        CoreError::InvalidQuantity {
            product_id: product_id.into(),
            quantity: quantity.to_string(),
        }
    }

    /// Creates an InvalidMoneyAmount error.
    pub fn invalid_money(value: impl Into<String>) -> Self {
        CoreError::InvalidMoneyAmount {
            value: value.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for identifiers and configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
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

    /// Invalid format (e.g., malformed owner key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
            product_id: "p1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for p1: available 3, requested 5"
        );

        let err = CoreError::invalid_quantity("p2", -1);
        assert_eq!(err.to_string(), "Invalid quantity -1 for product p2");
    }

    #[test]
    fn test_invalid_money_message_keeps_raw_value() {
        let err = CoreError::invalid_money("9.999");
        assert!(err.to_string().contains("'9.999'"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
