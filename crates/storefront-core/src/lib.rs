//! # storefront-core: Cart Pricing Logic
//!
//! Everything the storefront needs to turn a list of cart lines into
//! numbers: item counts, items price, tax, shipping and grand total. No I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Display layer                                │   │
//! │  │    Cart badge ──► Cart page ──► Checkout ──► Order summary      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/storefront (service)                    │   │
//! │  │    get_cart, add_to_cart, checkout, etc.                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ shipping  │  │   │
//! │  │   │  Product  │  │   Money   │  │ totals    │  │  policy   │  │   │
//! │  │   │ CartItem  │  │  TaxRate  │  │ lifecycle │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db (Database Layer)                  │   │
//! │  │            SQLite carts, orders, products, migrations           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - `count_items`, `compute_totals` and the `Cart` lifecycle
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`shipping`] - Pluggable shipping policies
//! - [`types`] - Domain types (Product, CartItem, CartTotals, etc.)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::compute_totals;
//! use storefront_core::shipping::ShippingRule;
//! use storefront_core::types::{CartLine, TaxRate};
//!
//! let lines: Vec<CartLine> = serde_json::from_str(
//!     r#"[{"productId":"p1","quantity":2,"unitPrice":"10.00"},
//!         {"productId":"p2","quantity":3,"unitPrice":"5.00"}]"#,
//! ).unwrap();
//!
//! let totals = compute_totals(&lines, TaxRate::from_bps(1500), &ShippingRule::default()).unwrap();
//! let summary = totals.summary();
//!
//! assert_eq!(summary.item_count, 5);
//! assert_eq!(summary.items_price, "35.00");
//! assert_eq!(summary.tax_price, "5.25");
//! assert_eq!(summary.shipping_price, "10.00");
//! assert_eq!(summary.total_price, "50.25");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{compute_totals, count_items, parse_cart_lines, Cart, CheckoutSnapshot, LineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use shipping::{ShippingPolicy, ShippingRule};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches typos like 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Tax rate applied when the store does not configure one (15%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1500;
