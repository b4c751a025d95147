//! # Validation Module
//!
//! Input validation for cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Display layer                                                │
//! │  └── Form checks, immediate feedback                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: storefront-core (THIS MODULE)                                │
//! │  ├── quantity: positive integer, at most MAX_ITEM_QUANTITY             │
//! │  ├── price: non-negative, two decimals                                 │
//! │  └── identifiers: present, bounded                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 1)                                             │
//! │  └── CHECK (unit_price_cents >= 0)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_quantity, validate_product_id};
//!
//! validate_product_id("p1").unwrap();
//! validate_quantity("p1", 5).unwrap();
//! assert!(validate_quantity("p1", 0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_ID_LEN: usize = 128;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 128 characters
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    validate_identifier("product_id", id)
}

/// Validates the identity part of an owner key (`session:<id>`).
pub fn validate_owner_id(id: &str) -> ValidationResult<()> {
    validate_identifier("owner", id)?;

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "owner".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

fn validate_identifier(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a cart line.
///
/// ## Rules
/// - Must be positive (> 0), otherwise `InvalidQuantity`
/// - Must not exceed MAX_ITEM_QUANTITY (999), otherwise `QuantityTooLarge`
///
/// ## User Workflow
/// ```text
/// Shopper picks quantity 5 ──► validate_quantity("p1", 5)
///       │
///       ├── qty <= 0?  → InvalidQuantity
///       ├── qty > 999? → QuantityTooLarge
///       └── OK → cart is updated
/// ```
pub fn validate_quantity(product_id: &str, qty: i64) -> CoreResult<()> {
    if qty <= 0 {
        return Err(CoreError::invalid_quantity(product_id, qty));
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: qty,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// Zero is allowed (free items); negative amounts are not.
pub fn validate_unit_price(price: Money) -> CoreResult<()> {
    if price.is_negative() {
        return Err(CoreError::invalid_money(price.to_decimal_string()));
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that another distinct line fits in the cart.
pub fn validate_cart_size(current_items: usize) -> CoreResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("p1").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id(&"a".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_owner_id() {
        assert!(validate_owner_id("9f1c2e").is_ok());
        assert!(validate_owner_id("has space").is_err());
        assert!(validate_owner_id("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("p1", 1).is_ok());
        assert!(validate_quantity("p1", 999).is_ok());

        assert_eq!(
            validate_quantity("p1", 0),
            Err(CoreError::invalid_quantity("p1", 0))
        );
        assert_eq!(
            validate_quantity("p1", -1),
            Err(CoreError::invalid_quantity("p1", -1))
        );
        assert!(matches!(
            validate_quantity("p1", 1000),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_cents(1099)).is_ok());
        assert!(validate_unit_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
