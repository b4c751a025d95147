//! # Money
//!
//! Integer cents, parsed once from the decimal strings the display layer
//! sends and formatted back only when a `CartSummary` is built.
//!
//! ```text
//!  "10.00" ──parse──► Money(1000) ──× qty, Σ, tax──► Money(5025) ──► "50.25"
//!  "9.999" ──parse──► InvalidMoneyAmount (never rounded)
//! ```
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price: Money = "10.99".parse().unwrap();
//! assert_eq!(price.cents(), 1099);
//! assert_eq!(price.checked_multiply_quantity(2).unwrap().to_string(), "21.98");
//! assert!("9.999".parse::<Money>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::TaxRate;

/// An amount in cents. Negative values only arise from arithmetic; `parse`
/// never produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal amount such as `"10.00"`, `"10.5"` or `"10"`.
    ///
    /// ## Rules
    /// - Unsigned digits, optionally followed by `.` and fraction digits
    /// - Fraction digits past the second must all be zero (`"9.990"` is 9.99)
    /// - Anything else fails with `InvalidMoneyAmount`: `"9.999"`, `"-1.00"`,
    ///   `""`, `"1e3"`, `"10."`, `" 10.00"`
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::parse("5.5").unwrap().cents(), 550);
    /// assert!(Money::parse("9.999").is_err());
    /// ```
    pub fn parse(input: &str) -> CoreResult<Money> {
        let invalid = || CoreError::invalid_money(input);

        let (whole, frac) = match input.split_once('.') {
            Some((whole, frac)) if !frac.is_empty() => (whole, frac),
            Some(_) => return Err(invalid()),
            None => (input, ""),
        };

        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let (kept, rest) = frac.split_at(frac.len().min(2));
        if rest.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }

        let major: i64 = whole.parse().map_err(|_| invalid())?;
        let minor: i64 = match kept.len() {
            0 => 0,
            1 => kept.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => kept.parse::<i64>().map_err(|_| invalid())?,
        };

        major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .map(Money)
            .ok_or_else(invalid)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax rounded half-up to the nearest cent.
    ///
    /// `(cents * bps + 5000) / 10000`, widened to i128. Returns `None` when
    /// the tax does not fit in an `i64` of cents (rates above 100% on huge
    /// amounts).
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(1000); // 10.00
    /// let rate = TaxRate::from_bps(825);   // 8.25%
    ///
    /// // 10.00 × 8.25% = 0.825 → 0.83
    /// assert_eq!(price.calculate_tax(rate).unwrap().cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        i64::try_from(tax_cents).ok().map(Money)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Formats the amount with exactly two decimal places, e.g. `"35.00"`.
    ///
    /// This is the representation the display layer expects.
    pub fn to_decimal_string(&self) -> String {
        self.to_string()
    }
}

/// Plain two-decimal form without a currency symbol.
///
/// Currency symbols are a store setting and are added by the app layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3500).to_string(), "35.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(i64::MIN).to_string(), "-92233720368547758.08");
        assert_eq!(Money::zero().to_decimal_string(), "0.00");
    }

    #[test]
    fn test_parse_accepts_two_decimal_amounts() {
        assert_eq!(Money::parse("10.00").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("0.01").unwrap().cents(), 1);
        assert_eq!(Money::parse("9.990").unwrap().cents(), 999);
        assert_eq!(Money::parse("007.10").unwrap().cents(), 710);
    }

    #[test]
    fn test_parse_rejects_unrepresentable_amounts() {
        for raw in ["9.999", "-1.00", "", ".50", "10.", "1e3", "1,00", " 1.00", "abc", "1.2.3"] {
            let err = Money::parse(raw).unwrap_err();
            assert_eq!(err, CoreError::invalid_money(raw), "input {raw:?}");
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(Money::parse("99999999999999999999").is_err());
        assert!(Money::parse("92233720368547758.08").is_err());
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825)).unwrap();
        assert_eq!(tax.cents(), 83);

        // 0.10 at 5% = 0.005 → 0.01
        let tax = Money::from_cents(10).calculate_tax(TaxRate::from_bps(500)).unwrap();
        assert_eq!(tax.cents(), 1);

        // 0.10 at 4% = 0.004 → 0.00
        let tax = Money::from_cents(10).calculate_tax(TaxRate::from_bps(400)).unwrap();
        assert_eq!(tax.cents(), 0);

        // Twice the largest amount does not fit in cents
        assert!(Money::from_cents(i64::MAX)
            .calculate_tax(TaxRate::from_bps(20000))
            .is_none());
    }

    #[test]
    fn test_checked_operations() {
        let max = Money::from_cents(i64::MAX);
        assert!(max.checked_add(Money::from_cents(1)).is_none());
        assert!(max.checked_multiply_quantity(2).is_none());
        assert_eq!(
            Money::from_cents(299).checked_multiply_quantity(3),
            Some(Money::from_cents(897))
        );
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::default(), Money::zero());
    }
}
