//! # Cart Aggregator
//!
//! Item counting, price aggregation and the cart lifecycle.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► count_items()    Σ quantity                    → item_count │
//! │        └─► compute_totals() Σ quantity × unit_price       → items      │
//! │                             items × tax_rate (half-up)    → tax        │
//! │                             ShippingPolicy(items)         → shipping   │
//! │                             items + tax + shipping        → total      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both functions are pure: no I/O, no hidden state, safe to call from any
//! number of request handlers at once. A malformed line rejects the whole
//! computation; lines with quantity zero are treated as absent.
//!
//! ## Usage
//! ```rust
//! use storefront_core::cart::{compute_totals, count_items};
//! use storefront_core::shipping::FreeShipping;
//! use storefront_core::types::{CartLine, TaxRate};
//!
//! let lines = vec![CartLine {
//!     product_id: "p1".to_string(),
//!     quantity: 2,
//!     unit_price: "10.00".to_string(),
//!     name: String::new(),
//!     slug: String::new(),
//!     image: String::new(),
//! }];
//!
//! assert_eq!(count_items(Some(&lines[..])).unwrap(), 2);
//! let totals = compute_totals(&lines, TaxRate::zero(), &FreeShipping).unwrap();
//! assert_eq!(totals.summary().items_price, "20.00");
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::shipping::ShippingPolicy;
use crate::types::{CartItem, CartLine, CartStatus, CartTotals, Product, TaxRate};
use crate::validation::{
    validate_cart_size, validate_quantity, validate_tax_rate_bps, validate_unit_price,
};

// =============================================================================
// Line Item View
// =============================================================================

/// What the aggregator needs from a line: who, how many, at what price.
///
/// Implemented for validated [`CartItem`]s and for raw [`CartLine`]s whose
/// price is still text.
pub trait LineItem {
    fn product_id(&self) -> &str;
    fn quantity(&self) -> i64;
    fn unit_price(&self) -> CoreResult<Money>;
}

impl LineItem for CartItem {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_price(&self) -> CoreResult<Money> {
        Ok(self.unit_price)
    }
}

impl LineItem for CartLine {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_price(&self) -> CoreResult<Money> {
        Money::parse(&self.unit_price)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Sums the quantity of every line.
///
/// An absent or empty sequence counts as zero. A negative quantity fails
/// with `InvalidQuantity`.
pub fn count_items<L: LineItem>(items: Option<&[L]>) -> CoreResult<i64> {
    let Some(items) = items else {
        return Ok(0);
    };

    items.iter().try_fold(0i64, |count, item| {
        let qty = checked_quantity(item)?;
        count
            .checked_add(qty)
            .ok_or_else(|| CoreError::invalid_quantity(item.product_id(), qty))
    })
}

/// Computes items, tax, shipping and grand totals.
///
/// ## Rules
/// - `items_price` = Σ quantity × unit_price (exact in cents)
/// - `tax_price` = items_price × tax_rate, rounded half-up to the cent
/// - `shipping_price` = whatever `shipping` decides for `items_price`
/// - `total_price` = items + tax + shipping
/// - No priced lines → every total is zero, shipping included
///
/// ## Errors
/// - `OutOfRange` for a tax rate above 100%
/// - `InvalidFormat` when two lines share a product id
/// - `InvalidQuantity` for a negative quantity
/// - `InvalidMoneyAmount` for a price that is negative or not expressible
///   with two decimals, or a total that does not fit in cents
pub fn compute_totals<L, S>(items: &[L], tax_rate: TaxRate, shipping: &S) -> CoreResult<CartTotals>
where
    L: LineItem,
    S: ShippingPolicy + ?Sized,
{
    validate_tax_rate_bps(tax_rate.bps())?;
    reject_duplicate_products(items)?;

    let mut item_count = 0i64;
    let mut items_price = Money::zero();

    for item in items {
        let qty = checked_quantity(item)?;
        let unit_price = item.unit_price()?;
        validate_unit_price(unit_price)?;

        if qty == 0 {
            continue;
        }

        let overflow = || CoreError::invalid_money(format!("{} x {}", unit_price, qty));
        let line_total = unit_price.checked_multiply_quantity(qty).ok_or_else(overflow)?;
        items_price = items_price.checked_add(line_total).ok_or_else(overflow)?;
        item_count = item_count
            .checked_add(qty)
            .ok_or_else(|| CoreError::invalid_quantity(item.product_id(), qty))?;
    }

    if item_count == 0 {
        return Ok(CartTotals::zero());
    }

    let tax_price = items_price
        .calculate_tax(tax_rate)
        .ok_or_else(|| CoreError::invalid_money(items_price.to_decimal_string()))?;
    let shipping_price = shipping.shipping_for(items_price);
    let total_price = items_price
        .checked_add(tax_price)
        .and_then(|subtotal| subtotal.checked_add(shipping_price))
        .ok_or_else(|| CoreError::invalid_money(items_price.to_decimal_string()))?;

    Ok(CartTotals {
        item_count,
        items_price,
        tax_price,
        shipping_price,
        total_price,
    })
}

fn checked_quantity<L: LineItem>(item: &L) -> CoreResult<i64> {
    let qty = item.quantity();
    if qty < 0 {
        return Err(CoreError::invalid_quantity(item.product_id(), qty));
    }
    Ok(qty)
}

/// One line per product; a repeated id is a malformed payload.
fn reject_duplicate_products<L: LineItem>(items: &[L]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.product_id()) {
            return Err(ValidationError::InvalidFormat {
                field: "items".to_string(),
                reason: format!("duplicate productId {}", item.product_id()),
            }
            .into());
        }
    }
    Ok(())
}

/// Parses a JSON array of line items as the display layer submits them.
///
/// `null` is an absent cart and yields no lines. Quantities must be JSON
/// integers (`1.5` fails with `InvalidQuantity`); prices may be strings or
/// numbers and are kept as text for the aggregator to validate.
pub fn parse_cart_lines(json: &str) -> CoreResult<Vec<CartLine>> {
    let value: Value = serde_json::from_str(json).map_err(|e| ValidationError::InvalidFormat {
        field: "items".to_string(),
        reason: e.to_string(),
    })?;

    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        _ => {
            return Err(ValidationError::InvalidFormat {
                field: "items".to_string(),
                reason: "expected an array of line items".to_string(),
            }
            .into())
        }
    };

    let lines = entries
        .iter()
        .map(parse_cart_line)
        .collect::<CoreResult<Vec<_>>>()?;
    reject_duplicate_products(&lines)?;
    Ok(lines)
}

fn parse_cart_line(entry: &Value) -> CoreResult<CartLine> {
    let text = |key: &str| entry.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

    let product_id = text("productId");
    if product_id.is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        }
        .into());
    }

    let quantity = match entry.get("quantity") {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| CoreError::invalid_quantity(&product_id, n))?,
        Some(other) => return Err(CoreError::invalid_quantity(&product_id, other)),
        None => return Err(CoreError::invalid_quantity(&product_id, "missing")),
    };

    let unit_price = match entry.get("unitPrice") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(CoreError::invalid_money(other.to_string())),
        None => return Err(CoreError::invalid_money("")),
    };

    Ok(CartLine {
        product_id,
        quantity,
        unit_price,
        name: text("name"),
        slug: text("slug"),
        image: text("image"),
    })
}

// =============================================================================
// Cart
// =============================================================================

/// A shopper's cart.
///
/// ## Invariants
/// - At most one line per `product_id`; adding again increases quantity
/// - Every line has `quantity >= 1`; setting a quantity of 0 removes the line
/// - At most `MAX_CART_ITEMS` lines, `MAX_ITEM_QUANTITY` units per line
/// - Totals are never stored, always derived from `items`
///
/// `version` is the optimistic-concurrency token the persistence layer bumps
/// on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub owner_key: String,
    pub items: Vec<CartItem>,
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// What a successful checkout hands to order placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSnapshot {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub status: CartStatus,
}

impl Cart {
    /// Creates an empty cart for the given owner key.
    pub fn new(owner_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: Uuid::new_v4().to_string(),
            owner_key: owner_key.into(),
            items: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a product or increases its quantity if already present.
    ///
    /// The product's display fields and price are frozen into the line the
    /// first time it is added.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(&product.id, quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            validate_quantity(&product.id, new_qty)?;
            ensure_stock(product, new_qty)?;
            item.quantity = new_qty;
        } else {
            validate_cart_size(self.items.len())?;
            ensure_stock(product, quantity)?;
            self.items.push(CartItem::from_product(product, quantity));
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id).map(|_| ());
        }

        validate_quantity(product_id, quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))?;
        item.quantity = quantity;

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Removes a line, returning it.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<CartItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))?;

        self.updated_at = Utc::now();
        Ok(self.items.remove(index))
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }

    /// Returns the line for a product, if present.
    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self) -> CartStatus {
        if self.items.is_empty() {
            CartStatus::Empty
        } else {
            CartStatus::Populated
        }
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Derives the cart totals.
    pub fn totals<S>(&self, tax_rate: TaxRate, shipping: &S) -> CoreResult<CartTotals>
    where
        S: ShippingPolicy + ?Sized,
    {
        compute_totals(&self.items, tax_rate, shipping)
    }

    /// Freezes the lines and totals for order placement and empties the cart.
    ///
    /// Fails with `CartEmpty` when there is nothing to check out; the cart
    /// is left untouched on any error.
    pub fn check_out<S>(&mut self, tax_rate: TaxRate, shipping: &S) -> CoreResult<CheckoutSnapshot>
    where
        S: ShippingPolicy + ?Sized,
    {
        if self.items.is_empty() {
            return Err(CoreError::CartEmpty);
        }

        let totals = self.totals(tax_rate, shipping)?;
        let items = std::mem::take(&mut self.items);
        self.updated_at = Utc::now();

        Ok(CheckoutSnapshot {
            items,
            totals,
            status: CartStatus::CheckedOut,
        })
    }
}

fn ensure_stock(product: &Product, quantity: i64) -> CoreResult<()> {
    if !product.can_sell(quantity) {
        return Err(CoreError::InsufficientStock {
            product_id: product.id.clone(),
            available: product.count_in_stock,
            requested: quantity,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
