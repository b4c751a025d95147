//! # Shipping Policies
//!
//! Shipping is an injected strategy: the aggregator asks a `ShippingPolicy`
//! what to charge for a given items price and never hardcodes a fee.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items_price ──► ShippingPolicy::shipping_for() ──► shipping_price     │
//! │                                                                         │
//! │  FlatRate(10.00)              always 10.00                             │
//! │  FreeOverThreshold(100, 10)   0.00 above 100.00, else 10.00            │
//! │  FreeShipping                 always 0.00                              │
//! │                                                                         │
//! │  ShippingRule  ── serde-configurable enum over the three above         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Empty carts are never charged; the aggregator short-circuits before the
//! policy is consulted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Decides the shipping price for a cart.
pub trait ShippingPolicy {
    /// Returns the shipping price for a non-empty cart worth `items_price`.
    fn shipping_for(&self, items_price: Money) -> Money;
}

impl<P: ShippingPolicy + ?Sized> ShippingPolicy for &P {
    fn shipping_for(&self, items_price: Money) -> Money {
        (**self).shipping_for(items_price)
    }
}

/// Same fee for every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRate(pub Money);

impl ShippingPolicy for FlatRate {
    fn shipping_for(&self, _items_price: Money) -> Money {
        self.0
    }
}

/// Free shipping once the items price is strictly above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeOverThreshold {
    pub threshold: Money,
    pub fee: Money,
}

impl ShippingPolicy for FreeOverThreshold {
    fn shipping_for(&self, items_price: Money) -> Money {
        if items_price > self.threshold {
            Money::zero()
        } else {
            self.fee
        }
    }
}

/// Never charges shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreeShipping;

impl ShippingPolicy for FreeShipping {
    fn shipping_for(&self, _items_price: Money) -> Money {
        Money::zero()
    }
}

/// Configurable shipping rule, as stored in store configuration.
///
/// ```json
/// { "rule": "free_over_threshold", "threshold": 10000, "fee": 1000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ShippingRule {
    Flat { fee: Money },
    FreeOverThreshold { threshold: Money, fee: Money },
    Free,
}

impl Default for ShippingRule {
    /// 10.00 shipping, free above 100.00.
    fn default() -> Self {
        ShippingRule::FreeOverThreshold {
            threshold: Money::from_cents(10000),
            fee: Money::from_cents(1000),
        }
    }
}

impl ShippingPolicy for ShippingRule {
    fn shipping_for(&self, items_price: Money) -> Money {
        match *self {
            ShippingRule::Flat { fee } => FlatRate(fee).shipping_for(items_price),
            ShippingRule::FreeOverThreshold { threshold, fee } => {
                FreeOverThreshold { threshold, fee }.shipping_for(items_price)
            }
            ShippingRule::Free => FreeShipping.shipping_for(items_price),
        }
    }
}
