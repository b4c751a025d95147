//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  product_id     │──►│  items (frozen) │       │
//! │  │  name/slug/img  │   │  name/slug/img  │   │  totals         │       │
//! │  │  price          │   │  unit_price     │   │  owner_key      │       │
//! │  └─────────────────┘   │  quantity       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │   CartTotals    │   │  CartSummary    │       │
//! │  │  bps (u32)      │   │  Money amounts  │──►│  "35.00" text   │       │
//! │  │  825 = 8.25%    │   │  + item_count   │   │  for display    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `CartItem` copies `name`, `slug`, `image` and the price from the product
//! at the moment it is added. Later catalog edits do not reach existing carts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Cart Owner
// =============================================================================

/// Who a cart belongs to, as resolved by the identity provider.
///
/// The cart logic never inspects the identity; it only turns it into the
/// opaque key the persistence layer stores carts under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    /// Anonymous shopper identified by a session cookie.
    Session(String),
    /// Signed-in user.
    User(String),
}

impl CartOwner {
    /// Returns the persistence key, e.g. `"session:abc"` or `"user:42"`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Returns the raw identity value.
    pub fn id(&self) -> &str {
        match self {
            CartOwner::Session(id) | CartOwner::User(id) => id,
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartOwner::Session(id) => write!(f, "session:{}", id),
            CartOwner::User(id) => write!(f, "user:{}", id),
        }
    }
}

impl FromStr for CartOwner {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "owner".to_string(),
            reason: reason.to_string(),
        };

        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected 'session:<id>' or 'user:<id>'"))?;

        crate::validation::validate_owner_id(id)?;

        match kind {
            "session" => Ok(CartOwner::Session(id.to_string())),
            "user" => Ok(CartOwner::User(id.to_string())),
            _ => Err(invalid("owner kind must be 'session' or 'user'")),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, as supplied by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// URL slug for the product page.
    pub slug: String,

    /// Primary image URL.
    pub image: String,

    /// Current catalog price.
    pub price: Money,

    /// Units available for sale.
    pub count_in_stock: i64,
}

impl Product {
    /// Checks if the requested quantity can be sold.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.count_in_stock >= quantity
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A validated line in a cart.
///
/// ## Invariants
/// - `quantity >= 1` (a line reaching zero is removed from the cart)
/// - `unit_price` is non-negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Non-owning reference to the catalog product.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Product slug at time of adding (frozen).
    pub slug: String,

    /// Product image at time of adding (frozen).
    pub image: String,

    /// Units requested.
    pub quantity: i64,

    /// Price per unit at time of adding (frozen).
    pub unit_price: Money,
}

impl CartItem {
    /// Creates a cart line from a product snapshot.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            quantity,
            unit_price: product.price,
        }
    }

    /// Line total (unit price × quantity), `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Line (boundary record)
// =============================================================================

/// A line item as it arrives from outside: the price is still text.
///
/// Display forms and JSON payloads carry prices like `"10.00"`. A `CartLine`
/// keeps that text untouched so the aggregator can reject an unrepresentable
/// amount instead of rounding it away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: String,
}

impl From<&CartItem> for CartLine {
    fn from(item: &CartItem) -> Self {
        CartLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_decimal_string(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
        }
    }
}

// =============================================================================
// Cart Status
// =============================================================================

/// Observable lifecycle state of a cart.
///
/// ```text
///   ┌───────┐  add   ┌───────────┐  check_out  ┌─────────────┐
///   │ Empty │──────►│ Populated │────────────►│ CheckedOut  │
///   └───────┘◄──────└───────────┘             └──────┬──────┘
///       ▲   remove last / clear                      │
///       └────────────────────────────────────────────┘
///                      cart reset to empty
/// ```
///
/// `CheckedOut` is reported by the checkout result only; the stored cart is
/// immediately back to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    Empty,
    Populated,
    CheckedOut,
}

// =============================================================================
// Totals
// =============================================================================

/// Derived cart totals in integer money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: i64,
    pub items_price: Money,
    pub tax_price: Money,
    pub shipping_price: Money,
    pub total_price: Money,
}

impl CartTotals {
    /// All-zero totals, used for empty carts.
    pub fn zero() -> Self {
        CartTotals::default()
    }

    /// Formats the totals for the display layer.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self)
    }
}

/// Totals as the display layer consumes them: two-decimal strings.
///
/// ```json
/// {
///   "itemCount": 5,
///   "itemsPrice": "35.00",
///   "taxPrice": "5.25",
///   "shippingPrice": "10.00",
///   "totalPrice": "50.25"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub item_count: i64,
    pub items_price: String,
    pub tax_price: String,
    pub shipping_price: String,
    pub total_price: String,
}

impl From<&CartTotals> for CartSummary {
    fn from(totals: &CartTotals) -> Self {
        CartSummary {
            item_count: totals.item_count,
            items_price: totals.items_price.to_decimal_string(),
            tax_price: totals.tax_price.to_decimal_string(),
            shipping_price: totals.shipping_price.to_decimal_string(),
            total_price: totals.total_price.to_decimal_string(),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order: the cart lines and totals frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub owner_key: String,
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "p1".to_string(),
            name: "Walnut Desk".to_string(),
            slug: "walnut-desk".to_string(),
            image: "/images/walnut-desk.jpg".to_string(),
            price: Money::from_cents(24999),
            count_in_stock: 4,
        }
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_owner_key_round_trip() {
        let owner = CartOwner::User("42".to_string());
        assert_eq!(owner.key(), "user:42");
        assert_eq!("user:42".parse::<CartOwner>().unwrap(), owner);

        let owner: CartOwner = "session:abc-123".parse().unwrap();
        assert_eq!(owner, CartOwner::Session("abc-123".to_string()));
        assert_eq!(owner.id(), "abc-123");
    }

    #[test]
    fn test_owner_key_rejects_malformed() {
        assert!("abc".parse::<CartOwner>().is_err());
        assert!("admin:1".parse::<CartOwner>().is_err());
        assert!("user:".parse::<CartOwner>().is_err());
    }

    #[test]
    fn test_cart_item_snapshots_product() {
        let item = CartItem::from_product(&product(), 2);
        assert_eq!(item.product_id, "p1");
        assert_eq!(item.slug, "walnut-desk");
        assert_eq!(item.unit_price.cents(), 24999);
        assert_eq!(item.line_total().map(|m| m.cents()), Some(49998));

        let huge = CartItem {
            unit_price: Money::from_cents(i64::MAX),
            ..item
        };
        assert!(huge.line_total().is_none());
    }

    #[test]
    fn test_product_can_sell() {
        assert!(product().can_sell(4));
        assert!(!product().can_sell(5));
    }

    #[test]
    fn test_summary_formats_two_decimals() {
        let totals = CartTotals {
            item_count: 5,
            items_price: Money::from_cents(3500),
            tax_price: Money::from_cents(525),
            shipping_price: Money::from_cents(1000),
            total_price: Money::from_cents(5025),
        };

        let summary = totals.summary();
        assert_eq!(summary.items_price, "35.00");
        assert_eq!(summary.tax_price, "5.25");
        assert_eq!(summary.shipping_price, "10.00");
        assert_eq!(summary.total_price, "50.25");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["itemCount"], 5);
        assert_eq!(json["itemsPrice"], "35.00");
    }

    #[test]
    fn test_cart_line_from_item_formats_price() {
        let line = CartLine::from(&CartItem::from_product(&product(), 1));
        assert_eq!(line.unit_price, "249.99");
    }

    #[test]
    fn test_cart_line_deserializes_camel_case() {
        let line: CartLine = serde_json::from_str(
            r#"{"productId":"p1","quantity":2,"unitPrice":"10.00"}"#,
        )
        .unwrap();
        assert_eq!(line.product_id, "p1");
        assert_eq!(line.unit_price, "10.00");
        assert!(line.name.is_empty());
    }
}
